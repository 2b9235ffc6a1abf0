use chrono::Local;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use proofdesk::{Checks, Dictionaries, GenericDictionary, ProjectDictionary, Scanner, TextBuffer};

const WORDS: [&str; 12] = [
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "and", "runs", "away", "home",
];

fn chapter(lines: usize) -> TextBuffer {
    (0..lines)
        .map(|i| match i % 4 {
            0 => "The quick brown fox jumps over the lazy dog.",
            1 => "And the dog runs  away (home) and the the fox.",
            2 => "\"The fox\" jumps over teh dog and runs home.",
            _ => "the lazy dog runs away from the quick brown fox!",
        })
        .collect()
}

fn bench_scan(c: &mut Criterion) {
    let dictionaries = Dictionaries::new(
        GenericDictionary::from_words(WORDS).unwrap(),
        ProjectDictionary::new(),
    );
    let buffer = chapter(2_000);
    let checks = Checks {
        auto_remove_blanks: false,
        ..Checks::default()
    };
    let scanner = Scanner::new(&dictionaries, checks, "bench", Local::now().naive_local());

    c.bench_function("scan 2000 lines", |b| {
        b.iter(|| scanner.scan(black_box(&buffer)))
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
