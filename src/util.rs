//! Utilities to help with building problems
use std::collections::HashSet;

/// Generates unique names that external solvers accept in .lp files
/// (ASCII letters, digits and `_`, starting with a letter, and not a bound
/// keyword such as `free` or `inf`).
#[derive(Debug, Default)]
pub struct UniqueNameGenerator {
    names: HashSet<String>,
}

impl UniqueNameGenerator {
    /// Returns a valid name, never returned before by this generator.
    ///
    /// ```
    /// use lp_modeling::util::UniqueNameGenerator;
    ///
    /// let mut gen = UniqueNameGenerator::default();
    /// assert_eq!(gen.add_name("x"), "x");
    /// assert_eq!(gen.add_name("Production[0]"), "Production_0");
    /// assert_eq!(gen.add_name("Assign[1,2]"), "Assign_1_2");
    /// assert_eq!(gen.add_name("!#?/"), "v");
    /// assert_eq!(gen.add_name("x"), "x_2"); // A name x is already present
    /// assert_eq!(gen.add_name("2nd"), "v2nd");
    /// assert_eq!(gen.add_name("free"), "vfree");
    /// ```
    pub fn add_name(&mut self, name: &str) -> String {
        let stem = stem(name);
        let mut candidate = stem.clone();
        let mut n = 1;
        while self.names.contains(&candidate) {
            n += 1;
            candidate = format!("{}_{}", stem, n);
        }
        self.names.insert(candidate.clone());
        candidate
    }
}

// words with a meaning in the `Bounds` section of an .lp file
const RESERVED: [&str; 3] = ["free", "inf", "infinity"];

fn stem(name: &str) -> String {
    let mut owned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let trimmed = owned.trim_matches('_');
    owned = trimmed.to_string();
    let reserved = RESERVED.iter().any(|word| owned.eq_ignore_ascii_case(word));
    if reserved || !owned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        owned.insert(0, 'v');
    }
    owned
}
