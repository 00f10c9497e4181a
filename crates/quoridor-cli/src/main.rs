mod command;
mod config;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
