use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

fn load_vocab(path: &str) -> HashMap<String, u64> {
    let file = File::open(path).expect("Failed to open vocab file");
    let reader = BufReader::new(file);
    let mut vocab = HashMap::new();
    for line in reader.lines() {
        let line = line.expect("Failed to read line");
        if let Some(pos) = line.rfind(' ') {
            let word = &line[..pos];
            let count: u64 = line[pos + 1..].trim().parse().expect("bad count field");
            vocab.insert(word.to_string(), count);
        }
    }
    vocab
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <vocab_path> [word] [--top N]", args[0]);
        std::process::exit(1);
    }

    let vocab_path = &args[1];
    let vocab = load_vocab(vocab_path);

    if args.len() >= 3 && args[2] != "--top" {
        let word = &args[2];
        match vocab.get(word) {
            Some(count) => println!("{word}\t{count}"),
            None => println!("'{word}' not found in {vocab_path}"),
        }
        return;
    }

    let top_n: usize = args
        .iter()
        .position(|a| a == "--top")
        .and_then(|i| args.get(i + 1))
        .and_then(|n| n.parse().ok())
        .unwrap_or(20);

    let mut entries: Vec<(&String, &u64)> = vocab.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1));
    println!("{} words total", vocab.len());
    for (word, count) in entries.into_iter().take(top_n) {
        println!("{word}\t{count}");
    }
}
