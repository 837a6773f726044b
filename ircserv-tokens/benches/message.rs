use criterion as c;
use criterion::{criterion_group, criterion_main};
use ircserv_tokens as irc;

const MESSAGE: &str = ":someone!someuser@some.host.example USER someusername what is :going on this is not what I paid for please stop using fake real names the more so if they're this long!!!";

fn message(c: &mut c::Criterion) {
    let mut long_message = String::with_capacity(4096);
    long_message.push_str(MESSAGE);
    (0..3000).for_each(|_| long_message.push('a'));
    c.bench_function("Message::parse()", |b| {
        b.iter(|| {
            let msg = irc::Message::parse(c::black_box(&long_message));
            c::black_box(msg.arguments().count());
        })
    })
    .bench_function("ReplyBuffer::reply()", |b| {
        b.iter(|| {
            let mut rb = irc::ReplyBuffer::new("irc.local", "someone");
            rb.reply(irc::rpl::TOPIC)
                .param("#hall")
                .trailing_param(c::black_box(MESSAGE));
            c::black_box(rb.build());
        })
    });
}

criterion_group!(benches, message);
criterion_main!(benches);
