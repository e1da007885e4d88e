//! Command-line flag normalization.
//!
//! Native modules carry compiler and linker flags written for a clang driver
//! invoked through a make-style shell. Before a flag list lands on a target
//! attribute it is tokenized (compiler flags only) and filtered through
//! predicates that drop flags the destination toolchain rejects or supplies
//! itself.

/// Flags the active clang toolchains do not understand. Mostly GCC-only
/// spellings that survive in legacy module definitions.
pub const UNKNOWN_CFLAGS: &[&str] = &[
    "-fdiagnostics-color",
    "-finline-functions",
    "-finline-limit=64",
    "-fno-canonical-system-headers",
    "-fno-tree-sra",
    "-fprefetch-loop-arrays",
    "-funswitch-loops",
    "-Wmaybe-uninitialized",
    "-Wno-error=maybe-uninitialized",
    "-Wno-extended-offsetof",
    "-Wno-free-nonheap-object",
    "-Wno-maybe-uninitialized",
    "-Wno-old-style-declaration",
    "-Wno-psabi",
    "-Wno-unused-local-typedefs",
];

/// A flag filter returns true when the flag must be dropped.
pub type FlagFilter = fn(&str) -> bool;

/// Drops `-std=` flags. The C and C++ standards are carried by dedicated
/// attributes, never as raw flags.
pub fn filter_out_std_flag(flag: &str) -> bool {
    flag.starts_with("-std=")
}

/// Drops flags the toolchain does not recognize.
pub fn filter_out_unknown_cflags(flag: &str) -> bool {
    UNKNOWN_CFLAGS.contains(&flag)
}

/// Normalizes a flag list for an attribute slot.
///
/// With `tokenize` set, each entry is split on whitespace so that values like
/// `"-Wall -Werror"` become two flags. Linker flags are never tokenized
/// because they may embed `$(location ...)` expansions containing spaces.
/// A flag is dropped when any filter claims it.
pub fn parse_command_line_flags(
    flags: &[String],
    tokenize: bool,
    filters: &[FlagFilter],
) -> Vec<String> {
    let mut result = Vec::new();
    for flag in flags {
        if tokenize {
            result.extend(flag.split_whitespace().map(str::to_owned));
        } else {
            result.push(flag.clone());
        }
    }
    result.retain(|flag| !filters.iter().any(|filter| filter(flag)));
    result
}
