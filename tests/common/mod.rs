use gamaffinity::pipeline::ROSTER_FILE_NAME;
use gamaffinity::types::Element;
use std::fs;
use std::path::Path;

const HEXAD_TRAITS: [&str; 6] = [
    "achiever",
    "player",
    "socialiser",
    "freeSpirit",
    "disruptor",
    "philanthropist",
];

/// Deterministic pseudo-coefficients so each element gets a distinct matrix.
fn coefficient(element_idx: usize, row: usize, col: usize) -> f64 {
    let raw = ((element_idx * 7 + row * 5 + col * 3) % 11) as f64;
    (raw - 5.0) / 10.0
}

fn pvalue(element_idx: usize, row: usize, col: usize) -> f64 {
    match (element_idx + row + col) % 4 {
        0 => 0.01,
        1 => 0.05,
        2 => 0.1,
        _ => 0.4,
    }
}

fn write_model(dir: &Path, columns: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    // Deliberately inconsistent spellings; the loader normalizes them.
    let rows = ["mivar", "MEVar", " AMOTVAR "];
    for (element_idx, element) in Element::ALL.into_iter().enumerate() {
        let header = format!(";{}", columns.join(";"));
        let mut coefs = vec![header.clone()];
        let mut pvals = vec![header];
        for (row_idx, row) in rows.iter().enumerate() {
            let c: Vec<String> = (0..columns.len())
                .map(|col| coefficient(element_idx, row_idx, col).to_string())
                .collect();
            let p: Vec<String> = (0..columns.len())
                .map(|col| pvalue(element_idx, row_idx, col).to_string())
                .collect();
            coefs.push(format!("{row};{}", c.join(";")));
            pvals.push(format!("{row};{}", p.join(";")));
        }
        fs::write(
            dir.join(format!("{element}PathCoefs.csv")),
            coefs.join("\n") + "\n",
        )
        .unwrap();
        fs::write(
            dir.join(format!("{element}pVals.csv")),
            pvals.join("\n") + "\n",
        )
        .unwrap();
    }
}

/// Writes a roster with two students plus complete Hexad and Motivation model folders.
pub fn write_data_dir(root: &Path) {
    write_model(&root.join("Hexad"), &HEXAD_TRAITS);
    write_model(&root.join("Motivation"), &["MI", "ME", "amotI"]);
    fs::write(
        root.join(ROSTER_FILE_NAME),
        "User;achiever;player;socialiser;freeSpirit;disruptor;philanthropist;micoI;miacI;mistI;meidI;meinI;mereI;amotI\n\
         elevebf01;4;2;3;1;0;5;5;4;6;2;3;4;1.5\n\
         elevebf02;1;5;2;4;3;0;2;2;2;6;5;7;3\n",
    )
    .unwrap();
}
