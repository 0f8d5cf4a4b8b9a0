use std::fs;

pub const WORKLOADS: [(&str, &str); 2] = [
    ("sort", "tests/programs/sort.psc"),
    ("primes", "tests/programs/primes.psc"),
];

pub fn load_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}
