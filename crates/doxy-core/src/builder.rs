//! Build orchestration for source builds.
//!
//! doxygen is configured and compiled with CMake; its parsers need flex and
//! bison. Those three tools are the recipe's build requirements: they are
//! located on `PATH` up front so a missing one fails before anything is
//! downloaded.
//!
//! ## Layout
//!
//! | Path | Content |
//! |---|---|
//! | `<workdir>/source_subfolder` | Patched upstream source |
//! | `<workdir>/build_subfolder` | CMake binary directory |
//! | `<workdir>/install` | `CMAKE_INSTALL_PREFIX` |
//! | `<workdir>/doxy_toolchain.cmake` | Tool locations, included by the patched `CMakeLists.txt` |

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use doxy_schema::{Arch, Compiler, Platform};

use crate::error::RecipeError;

/// CMake binary directory, relative to the work directory.
pub const BUILD_SUBFOLDER: &str = "build_subfolder";

/// `CMAKE_INSTALL_PREFIX`, relative to the work directory.
pub const INSTALL_SUBFOLDER: &str = "install";

const FLEX_NAMES: &[&str] = &["flex", "win_flex"];
const BISON_NAMES: &[&str] = &["bison", "win_bison"];

/// Located build requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub cmake: PathBuf,
    pub flex: PathBuf,
    pub bison: PathBuf,
}

impl Toolchain {
    /// Find cmake, flex and bison on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::MissingTool`] naming the first tool not found.
    pub fn discover() -> Result<Self, RecipeError> {
        Ok(Self {
            cmake: locate("cmake", &["cmake"])?,
            flex: locate("flex", FLEX_NAMES)?,
            bison: locate("bison", BISON_NAMES)?,
        })
    }

    /// CMake snippet pinning the flex and bison executables.
    pub fn cmake_include(&self) -> String {
        format!(
            "set(FLEX_EXECUTABLE \"{}\" CACHE FILEPATH \"flex\" FORCE)\nset(BISON_EXECUTABLE \"{}\" CACHE FILEPATH \"bison\" FORCE)\n",
            cmake_path(&self.flex),
            cmake_path(&self.bison)
        )
    }

    /// Write [`Self::cmake_include`] to `path`.
    pub fn write_cmake_include(&self, path: &Path) -> Result<(), RecipeError> {
        std::fs::write(path, self.cmake_include())?;
        Ok(())
    }
}

fn locate(tool: &str, candidates: &[&str]) -> Result<PathBuf, RecipeError> {
    let path = candidates
        .iter()
        .find_map(|c| which::which(c).ok())
        .ok_or_else(|| RecipeError::MissingTool(tool.to_string()))?;
    tracing::debug!(tool, path = %path.display(), "build tool located");
    Ok(path)
}

/// CMake wants forward slashes, even on Windows.
fn cmake_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Visual Studio generator platform for `-A`.
fn msvc_platform(arch: Arch) -> &'static str {
    match arch {
        Arch::X86 => "Win32",
        Arch::X86_64 => "x64",
        Arch::Armv8 => "ARM64",
    }
}

/// Runs the configure, build and install steps.
#[derive(Debug)]
pub struct Builder<'a> {
    toolchain: &'a Toolchain,
    platform: &'a Platform,
    verbose: bool,
    log_path: PathBuf,
}

impl<'a> Builder<'a> {
    /// Create a new builder. Output goes to `log_path` unless `verbose`.
    pub fn new(
        toolchain: &'a Toolchain,
        platform: &'a Platform,
        verbose: bool,
        log_path: PathBuf,
    ) -> Self {
        Self {
            toolchain,
            platform,
            verbose,
            log_path,
        }
    }

    /// Arguments for the configure step.
    ///
    /// The build machine's architecture is used, not the target's: the
    /// binaries run on the build machine.
    pub fn configure_args(&self, source: &Path, build: &Path, prefix: &Path) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            source.to_string_lossy().to_string(),
            "-B".to_string(),
            build.to_string_lossy().to_string(),
            "-DCMAKE_BUILD_TYPE=Release".to_string(),
            format!("-DCMAKE_INSTALL_PREFIX={}", cmake_path(prefix)),
        ];
        if self.platform.compiler == Compiler::Msvc {
            args.push("-A".to_string());
            args.push(msvc_platform(self.platform.build_arch).to_string());
        }
        args
    }

    /// `cmake -S <source> -B <build> ...`
    pub fn configure(&self, source: &Path, build: &Path, prefix: &Path) -> Result<(), RecipeError> {
        std::fs::create_dir_all(build)?;
        let mut cmd = Command::new(&self.toolchain.cmake);
        cmd.args(self.configure_args(source, build, prefix));
        self.run("configure", cmd)
    }

    /// `cmake --build <build> --config Release --parallel <jobs>`
    pub fn build(&self, build: &Path) -> Result<(), RecipeError> {
        let mut cmd = Command::new(&self.toolchain.cmake);
        cmd.arg("--build")
            .arg(build)
            .args(["--config", "Release", "--parallel"])
            .arg(num_cpus::get().to_string());
        self.run("build", cmd)
    }

    /// `cmake --install <build> --config Release`
    pub fn install(&self, build: &Path) -> Result<(), RecipeError> {
        let mut cmd = Command::new(&self.toolchain.cmake);
        cmd.arg("--install")
            .arg(build)
            .args(["--config", "Release"]);
        self.run("install", cmd)
    }

    fn run(&self, step: &'static str, mut cmd: Command) -> Result<(), RecipeError> {
        tracing::info!(step, "cmake {:?}", cmd.get_args().collect::<Vec<_>>());

        let status = if self.verbose {
            cmd.status()
                .map_err(|e| RecipeError::build(step, format!("failed to spawn cmake: {e}")))?
        } else {
            if let Some(parent) = self.log_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_path)?;
            let log_err = log_file.try_clone()?;
            cmd.stdout(Stdio::from(log_file))
                .stderr(Stdio::from(log_err))
                .status()
                .map_err(|e| RecipeError::build(step, format!("failed to spawn cmake: {e}")))?
        };

        if status.success() {
            Ok(())
        } else if self.verbose {
            Err(RecipeError::build(step, format!("cmake exited with {status}")))
        } else {
            Err(RecipeError::build(
                step,
                format!(
                    "cmake exited with {status}, see {}",
                    self.log_path.display()
                ),
            ))
        }
    }
}
