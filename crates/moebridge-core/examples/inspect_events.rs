use moebridge_core::event::RawEvent;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args().nth(1);
    let reader: Box<dyn BufRead> = match path {
        Some(p) => Box::new(BufReader::new(File::open(p)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<RawEvent>(&line) {
            Ok(event) => println!(
                "{}\t{}\t{}",
                event.verb.id,
                event.object.id,
                event.parents().len()
            ),
            Err(e) => println!("<invalid>\t{e}"),
        }
    }

    Ok(())
}
