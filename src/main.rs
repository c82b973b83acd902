use log::{info, Level, Metadata, Record};
use srcon::server::Server;
use srcon::DEFAULT_ADDR;
use std::env;
use std::error::Error;
use tokio::signal;

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{} - {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = log::set_logger(&SimpleLogger).map(|()| log::set_max_level(log::LevelFilter::Info));

    // usage: srcon [addr] [password]
    let mut args = env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let password = args.next().unwrap_or_else(|| "hello".to_string());

    let server = Server::start_on(&addr, &password).await?;

    tokio::select!(
        _ = server => {}
        _ = signal::ctrl_c() => {}
    );

    info!("bye");
    Ok(())
}
