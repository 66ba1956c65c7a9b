#![allow(non_snake_case)]
use RustedRelax::Examples::iterative_examples::iterative_examples;

fn main() {
    let example = 0;
    match example {
        0 => {
            // all methods on all test systems
            iterative_examples(0);
        }
        1 => {
            // SOR: iterations vs relaxation factor
            iterative_examples(1);
        }
        2 => {
            // solver settings from TOML, logging and statistics table
            iterative_examples(2);
        }
        3 => {
            // spectral radius diagnostics and a capped divergent run
            iterative_examples(3);
        }
        4 => {
            // conjugate gradient, solution written to csv
            iterative_examples(4);
        }
        _ => {
            println!("example not found");
        }
    }
}
