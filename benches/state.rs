use criterion as c;
use criterion::{criterion_group, criterion_main};
use ircserv::{config, MessageQueueItem, State};
use ircserv_tokens::Message;
use std::net::SocketAddr;
use tokio::sync::mpsc;

type Queue = mpsc::UnboundedReceiver<MessageQueueItem>;

struct StateCase(State, Vec<(usize, Queue)>);

fn handle_message(s: &mut State, id: usize, message: &str) {
    let _ = s.handle_message(id, Message::parse(message));
}

fn flush(queue: &mut Queue) {
    while queue.try_recv().is_ok() {}
}

fn state(num_clients: usize) -> StateCase {
    let mut s = State::new(config::State::sample());
    let mut clients = Vec::with_capacity(num_clients);
    for i in 0..num_clients {
        let (queue, mut outgoing) = mpsc::unbounded_channel();
        let addr = SocketAddr::from(([127, 0, 0, 1], 1024 + i as u16));
        let id = s.peer_joined(queue, addr);
        handle_message(&mut s, id, &format!("NICK c{}", i));
        handle_message(&mut s, id, "USER X X X X");
        flush(&mut outgoing);
        clients.push((id, outgoing));
    }
    StateCase(s, clients)
}

impl StateCase {
    fn all_send(mut self, message: &str) -> Self {
        for c in &self.1 {
            handle_message(&mut self.0, c.0, message);
        }
        for c in &mut self.1 {
            flush(&mut c.1);
        }
        self
    }
}

fn bench(c: &mut c::Criterion) {
    c.bench_function("PRIVMSG to a 1000-user channel", |b| {
        let StateCase(mut s, mut cs) = state(1000).all_send("JOIN #channel");
        let sender = cs[0].0;
        b.iter(|| {
            handle_message(&mut s, sender, "PRIVMSG #channel :salut ça va ?");
            for c in &mut cs {
                flush(&mut c.1);
            }
        })
    })
    .bench_function("JOIN and PART a 100-user channel", |b| {
        let StateCase(mut s, mut cs) = state(100).all_send("JOIN #channel");
        let (queue, mut outgoing) = mpsc::unbounded_channel();
        let joiner = s.peer_joined(queue, SocketAddr::from(([127, 0, 0, 1], 1)));
        handle_message(&mut s, joiner, "NICK joiner");
        handle_message(&mut s, joiner, "USER X X X X");
        b.iter(|| {
            handle_message(&mut s, joiner, "JOIN #channel");
            handle_message(&mut s, joiner, "PART #channel");
            flush(&mut outgoing);
            for c in &mut cs {
                flush(&mut c.1);
            }
        })
    });
}

criterion_group!(benches, bench);
criterion_main!(benches);
