use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result, bail};
use pseudoparse::{lexer, parser, source};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut dump_tokens = false;
    let mut input_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tokens" | "-t" => {
                dump_tokens = true;
            }
            _ => {
                input_path = Some(arg);
                if args.next().is_some() {
                    bail!("Only one input file is supported");
                }
                break;
            }
        }
    }

    let raw = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let (clean, map) = source::normalize(&raw);

    let tokens = match lexer::tokenize(&clean) {
        Ok(tokens) => tokens,
        Err(error) => bail!("{error}\n{}", map.annotate(error.position())),
    };
    if dump_tokens {
        for token in &tokens {
            println!("{token:?}");
        }
        return Ok(());
    }

    match parser::parse_tokens(tokens) {
        Ok(block) => {
            println!("{block:#?}");
            Ok(())
        }
        Err(error) => bail!("{error}\n{}", map.annotate(error.position())),
    }
}
