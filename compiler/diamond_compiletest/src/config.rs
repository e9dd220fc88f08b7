//! Compiler wrapper configuration.

use std::path::PathBuf;

/// Environment variable naming the `javac` executable.
pub const JAVAC_ENV: &str = "DIAMOND_JAVAC";

/// Settings for [`CompileTestUtils`](crate::CompileTestUtils) and the
/// `javac` backend.
#[derive(Clone, Debug, Default)]
pub struct CompileTestConfig {
    /// Explicit compiler executable. Takes precedence over `java_home`.
    pub javac: Option<PathBuf>,
    /// JDK installation, used to locate `bin/javac` and, on JDK 8,
    /// `lib/tools.jar`.
    pub java_home: Option<PathBuf>,
    /// Directories or jars on the compile classpath.
    pub classpath: Vec<PathBuf>,
    /// Options appended to every compiler invocation.
    pub extra_options: Vec<String>,
}

impl CompileTestConfig {
    /// Read `DIAMOND_JAVAC` and `JAVA_HOME`.
    pub fn from_env() -> Self {
        CompileTestConfig {
            javac: std::env::var_os(JAVAC_ENV).map(PathBuf::from),
            java_home: std::env::var_os("JAVA_HOME").map(PathBuf::from),
            ..CompileTestConfig::default()
        }
    }

    /// The compiler to run: `javac`, else `java_home/bin/javac`, else
    /// `javac` from `PATH`.
    pub fn javac_program(&self) -> PathBuf {
        if let Some(javac) = &self.javac {
            return javac.clone();
        }
        if let Some(home) = &self.java_home {
            let candidate = home.join("bin").join(executable("javac"));
            if candidate.is_file() {
                return candidate;
            }
        }
        PathBuf::from(executable("javac"))
    }
}

fn executable(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}
