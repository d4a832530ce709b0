//! Classify monitoring messages without translating them.
//!
//! Usage:
//!   cargo run --bin classify -- "Database connection failed"
//!   journalctl -f | cargo run --bin classify
//!
//! With arguments, prints the category of the joined argument text. Without
//! arguments, reads one message per line from stdin and prints
//! `<category>\t<message>` for each.

use std::io::{self, BufRead};

use anyhow::Result;

use alert_babel::classifier::classify;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            println!("{}\t{}", classify(text), text);
        }
    } else {
        println!("{}", classify(&args.join(" ")));
    }

    Ok(())
}
