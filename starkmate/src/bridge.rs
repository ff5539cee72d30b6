use std::{fmt, path::Path};

/// A single external process call: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Discard stdout/stderr instead of inheriting them.
    pub quiet: bool,
}

impl Invocation {
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How the Cairo toolchain is reached from this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bridge {
    /// Through `wsl`, with Windows paths mapped under `/mnt`.
    Wsl,
    /// Toolchain binaries run directly on the host.
    Native,
}

impl Default for Bridge {
    fn default() -> Self {
        if cfg!(windows) {
            Bridge::Wsl
        } else {
            Bridge::Native
        }
    }
}

impl Bridge {
    pub fn invocation<I, S>(&self, tool: &str, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = args.into_iter().map(Into::into);
        match self {
            Bridge::Wsl => Invocation {
                program: "wsl".to_string(),
                args: std::iter::once(tool.to_string()).chain(args).collect(),
                quiet: false,
            },
            Bridge::Native => Invocation {
                program: tool.to_string(),
                args: args.collect(),
                quiet: false,
            },
        }
    }

    pub fn translate(&self, path: &Path) -> String {
        match self {
            Bridge::Wsl => to_wsl_path(path),
            Bridge::Native => path.display().to_string(),
        }
    }
}

/// `C:\work\a.cairo` becomes `/mnt/c/work/a.cairo`; relative paths only get
/// their separators flipped.
pub fn to_wsl_path(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let drive = (bytes[0] as char).to_ascii_lowercase();
        format!("/mnt/{drive}{}", &raw[2..])
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(r"C:\Users\dev\hello.cairo", "/mnt/c/Users/dev/hello.cairo")]
    #[case(r"d:\out\hello.sierra.json", "/mnt/d/out/hello.sierra.json")]
    #[case(r"contracts\hello.cairo", "contracts/hello.cairo")]
    #[case("out/hello.casm.json", "out/hello.casm.json")]
    #[case("/home/dev/hello.cairo", "/home/dev/hello.cairo")]
    fn wsl_paths(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_wsl_path(&PathBuf::from(input)), expected);
    }

    #[test]
    fn wsl_bridge_prefixes_tool() {
        let inv = Bridge::Wsl.invocation("cairo-compile", ["--version"]);
        assert_eq!(inv.program, "wsl");
        assert_eq!(inv.args, vec!["cairo-compile", "--version"]);
        assert_eq!(inv.to_string(), "wsl cairo-compile --version");
    }

    #[test]
    fn native_bridge_runs_tool_directly() {
        let inv = Bridge::Native.invocation("cairo-compile-casm", ["a", "b"]).quiet();
        assert_eq!(inv.program, "cairo-compile-casm");
        assert_eq!(inv.args, vec!["a", "b"]);
        assert!(inv.quiet);
        assert_eq!(Bridge::Native.translate(Path::new(r"C:\x")), r"C:\x");
    }
}
