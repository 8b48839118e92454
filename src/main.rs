//! prosetree CLI - markup events (JSON) to ProseMirror document JSON

use std::io::{self, Read, Write};

fn main() -> prosetree::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // Simple usage: read from stdin or file
    let input = if args.len() > 1 && args[1] != "-" {
        std::fs::read_to_string(&args[1])?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let events: Vec<prosetree::MarkupEvent> = serde_json::from_str(&input)?;
    let json = prosetree::to_json(&events)?;
    let mut stdout = io::stdout();
    stdout.write_all(json.as_bytes())?;
    stdout.write_all(b"\n")?;

    Ok(())
}
