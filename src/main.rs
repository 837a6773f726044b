fn main() {
    ircserv::start();
}
