use once_cell::sync::Lazy;
use regex::Regex;

use super::LanguageHeuristic;

/// C++: C-family signals plus `std::` usage
pub struct CppHeuristic;

/// C: `#include` or `int main(` without C++ markers
pub struct CHeuristic;

static C_FAMILY_SIGNALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#include|int\s+main\s*\(").unwrap());

static CPP_SIGNALS: Lazy<Regex> = Lazy::new(|| Regex::new(r"std::|using\s+namespace\s").unwrap());

static INCLUDE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^#include\s*[<"][^>"]+[>"]\s*$"#).unwrap());

impl LanguageHeuristic for CppHeuristic {
    fn name(&self) -> &'static str {
        "cpp"
    }

    fn extension(&self) -> &'static str {
        "cpp"
    }

    fn detect(&self, code: &str) -> bool {
        C_FAMILY_SIGNALS.is_match(code) && CPP_SIGNALS.is_match(code)
    }

    fn is_import(&self, line: &str) -> bool {
        INCLUDE.is_match(line)
    }
}

impl LanguageHeuristic for CHeuristic {
    fn name(&self) -> &'static str {
        "c"
    }

    fn extension(&self) -> &'static str {
        "c"
    }

    fn detect(&self, code: &str) -> bool {
        C_FAMILY_SIGNALS.is_match(code)
    }

    fn is_import(&self, line: &str) -> bool {
        INCLUDE.is_match(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpp_needs_std() {
        assert!(CppHeuristic.detect("#include <vector>\nstd::vector<int> v;"));
        assert!(!CppHeuristic.detect("#include <stdio.h>"));
        assert!(!CppHeuristic.detect("std::string s;"));
    }

    #[test]
    fn test_c_detect() {
        assert!(CHeuristic.detect("#include <stdlib.h>"));
        assert!(CHeuristic.detect("int main(void) { return 0; }"));
        assert!(!CHeuristic.detect("fn main() {}"));
    }

    #[test]
    fn test_include_is_import() {
        assert!(CHeuristic.is_import("#include <stdio.h>"));
        assert!(CppHeuristic.is_import("#include \"local.h\""));
        assert!(!CHeuristic.is_import("#define MAX 10"));
        assert!(!CHeuristic.is_import("  #include <stdio.h>"));
    }
}
