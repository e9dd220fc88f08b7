//! The system `javac`, run as a child process.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::CompileTestConfig;
use crate::error::CompileError;

use super::{CompileRequest, CompilerBackend};

/// Packages of the `jdk.compiler` module opened to processors that use
/// javac internals.
pub const REQUIRED_EXPORTS: &[&str] = &[
    "com.sun.source.doctree",
    "com.sun.source.tree",
    "com.sun.source.util",
    "com.sun.tools.javac",
    "com.sun.tools.javac.api",
    "com.sun.tools.javac.code",
    "com.sun.tools.javac.comp",
    "com.sun.tools.javac.file",
    "com.sun.tools.javac.jvm",
    "com.sun.tools.javac.main",
    "com.sun.tools.javac.model",
    "com.sun.tools.javac.nio",
    "com.sun.tools.javac.parser",
    "com.sun.tools.javac.processing",
    "com.sun.tools.javac.resources",
    "com.sun.tools.javac.services",
    "com.sun.tools.javac.sym",
    "com.sun.tools.javac.tree",
    "com.sun.tools.javac.util",
];

/// Feature release of a `javac`: 8 for `1.8.0_292`, 17 for `17.0.2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct JavacVersion(pub u32);

impl JavacVersion {
    /// Parse the output of `javac -version` (`javac 1.8.0_292`,
    /// `javac 17.0.2`, `javac 21`).
    pub fn parse(output: &str) -> Option<Self> {
        let version = output
            .lines()
            .find_map(|line| line.trim().strip_prefix("javac "))?
            .trim();
        let mut parts = version.split(|c: char| !c.is_ascii_digit());
        let first: u32 = parts.next()?.parse().ok()?;
        if first == 1 {
            parts.next()?.parse().ok().map(JavacVersion)
        } else {
            Some(JavacVersion(first))
        }
    }

    /// Whether the module system (and with it `--add-exports`) exists.
    pub fn has_modules(self) -> bool {
        self.0 >= 9
    }
}

/// [`CompilerBackend`] over a `javac` executable.
#[derive(Clone, Debug)]
pub struct JavacBackend {
    program: PathBuf,
    version: Option<JavacVersion>,
    /// `lib/tools.jar` of a JDK 8, appended to every classpath.
    tools_jar: Option<PathBuf>,
    extra_options: Vec<String>,
}

impl JavacBackend {
    /// Locate `javac` per `config` and ask it for its version.
    ///
    /// An unrecognized version string is logged and treated as a modular
    /// (9+) compiler.
    pub fn detect(config: &CompileTestConfig) -> Result<Self, CompileError> {
        let program = config.javac_program();
        let output = Command::new(&program)
            .arg("-version")
            .output()
            .map_err(|e| launch_error(&program, &e))?;
        // javac 8 prints its version on stderr, later releases on stdout.
        let text = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let version = JavacVersion::parse(&text);
        match version {
            Some(v) => tracing::debug!(program = %program.display(), version = v.0, "found javac"),
            None => tracing::warn!(
                program = %program.display(),
                output = text.trim(),
                "unrecognized javac version"
            ),
        }
        Ok(Self::with_version(config, version))
    }

    /// Build a backend without running `javac`.
    pub fn with_version(config: &CompileTestConfig, version: Option<JavacVersion>) -> Self {
        let tools_jar = match version {
            Some(v) if !v.has_modules() => config.java_home.as_deref().and_then(find_tools_jar),
            _ => None,
        };
        JavacBackend {
            program: config.javac_program(),
            version,
            tools_jar,
            extra_options: config.extra_options.clone(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn version(&self) -> Option<JavacVersion> {
        self.version
    }

    /// The command line for `request`, without the program itself.
    pub fn args(&self, request: &CompileRequest<'_>) -> Result<Vec<OsString>, CompileError> {
        let mut args: Vec<OsString> = vec!["-d".into(), request.output_dir.into()];
        args.push("-s".into());
        args.push(request.generated_dir.into());

        let mut classpath = request.classpath.to_vec();
        classpath.extend(self.tools_jar.iter().cloned());
        args.push("-cp".into());
        args.push(self.join(&classpath)?);

        for a in ["-encoding", "UTF-8", "-implicit:class"] {
            args.push(a.into());
        }

        match request.processor {
            None => args.push("-proc:none".into()),
            Some(processor) => {
                let mut path = vec![processor.path.to_path_buf()];
                path.extend(classpath.iter().cloned());
                args.push("-processorpath".into());
                args.push(self.join(&path)?);
                args.push("-processor".into());
                args.push(processor.class_name.into());
            }
        }

        if self.exports_modules() {
            for export in REQUIRED_EXPORTS {
                args.push("--add-exports".into());
                args.push(format!("jdk.compiler/{export}=ALL-UNNAMED").into());
                args.push(format!("-J--add-exports=jdk.compiler/{export}=ALL-UNNAMED").into());
            }
        }

        args.extend(self.extra_options.iter().map(OsString::from));
        args.push(request.source_file.into());
        Ok(args)
    }

    fn exports_modules(&self) -> bool {
        self.version.is_none_or(JavacVersion::has_modules)
    }

    fn join(&self, paths: &[PathBuf]) -> Result<OsString, CompileError> {
        std::env::join_paths(paths).map_err(|e| CompileError::Launch {
            program: self.program.display().to_string(),
            message: format!("invalid classpath: {e}"),
        })
    }
}

impl CompilerBackend for JavacBackend {
    #[tracing::instrument(level = "debug", skip_all, fields(source = %request.source_file.display()))]
    fn compile(&self, request: &CompileRequest<'_>) -> Result<bool, CompileError> {
        let args = self.args(request)?;
        tracing::debug!(program = %self.program.display(), ?args, "running javac");
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| launch_error(&self.program, &e))?;

        for stream in [&output.stdout, &output.stderr] {
            for line in String::from_utf8_lossy(stream).lines() {
                eprintln!("{line}");
            }
        }

        let success = output.status.success();
        if !success {
            tracing::debug!(status = ?output.status.code(), "javac reported errors");
        }
        Ok(success)
    }
}

fn launch_error(program: &Path, err: &std::io::Error) -> CompileError {
    let program = program.display().to_string();
    if err.kind() == std::io::ErrorKind::NotFound {
        CompileError::CompilerNotFound {
            program,
            message: "install a JDK, set JAVA_HOME, or point DIAMOND_JAVAC at javac".to_string(),
        }
    } else {
        CompileError::Launch {
            program,
            message: err.to_string(),
        }
    }
}

/// `lib/tools.jar` under a JDK 8 home, also when `JAVA_HOME` names its `jre`.
fn find_tools_jar(java_home: &Path) -> Option<PathBuf> {
    [Some(java_home), java_home.parent()]
        .into_iter()
        .flatten()
        .map(|home| home.join("lib").join("tools.jar"))
        .find(|jar| jar.is_file())
}
