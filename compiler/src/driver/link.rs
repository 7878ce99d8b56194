use std::path::{Path, PathBuf};

use tonyc::linker::{LinkerSetupError, create_linker_command, resolve_runtime_library_path_from_current_exe};

use super::{CompileError, format_command};

/// A linker error.
pub(crate) enum LinkError {
    /// Failed to execute the linker command.
    ExecutionFailed(std::io::Error),
    /// Failed to resolve the absolute path of the current executable.
    CurrentExecutablePathResolutionFailed(std::io::Error),
    /// Current executable path has no parent directory.
    CurrentExecutableParentNotFound { executable: PathBuf },
    /// Tony runtime library was not found next to the tonyc executable.
    RuntimeLibraryNotFound { executable: PathBuf, path: PathBuf },
    /// Tony runtime library path exists but is not a regular file.
    RuntimeLibraryNotAFile { executable: PathBuf, path: PathBuf },
    /// Failed to access the runtime library path due to an I/O error.
    RuntimeLibraryAccessFailed {
        executable: PathBuf,
        path: PathBuf,
        source: std::io::Error,
    },
    #[cfg(all(target_os = "windows", target_env = "msvc"))]
    UnsupportedMsvcArchitecture { arch: String },
    #[cfg(all(target_os = "windows", target_env = "msvc"))]
    MsvcLinkerNotFound { msvc_arch: &'static str },
    /// Linker exited with non-zero status.
    Failed {
        exit_code: String,
        stdout: String,
        stderr: String,
    },
}

impl std::fmt::Display for LinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkError::ExecutionFailed(io_err) => write!(f, "failed to run linker: {}", io_err),
            LinkError::CurrentExecutablePathResolutionFailed(io_err) => {
                write!(f, "failed to resolve current executable path: {}", io_err)
            }
            LinkError::CurrentExecutableParentNotFound { executable } => write!(
                f,
                "current executable path '{}' has no parent directory. This is a compiler bug.",
                executable.display()
            ),
            LinkError::RuntimeLibraryNotFound { executable, path } => write!(
                f,
                "Tony runtime library not found at '{}' (resolved from executable '{}'). Place the 'tonyc' executable and runtime library in the same directory.",
                path.display(),
                executable.display()
            ),
            LinkError::RuntimeLibraryNotAFile { executable, path } => write!(
                f,
                "Tony runtime library path '{}' is not a regular file (resolved from executable '{}'). Place the 'tonyc' executable and runtime library in the same directory.",
                path.display(),
                executable.display()
            ),
            LinkError::RuntimeLibraryAccessFailed {
                executable,
                path,
                source,
            } => write!(
                f,
                "failed to access Tony runtime library path '{}' (resolved from executable '{}'): {}",
                path.display(),
                executable.display(),
                source
            ),
            #[cfg(all(target_os = "windows", target_env = "msvc"))]
            LinkError::UnsupportedMsvcArchitecture { arch } => write!(
                f,
                "unsupported architecture '{}' for MSVC linker auto-detection. Supported architectures are 'x86_64', 'aarch64', and 'x86'.",
                arch
            ),
            #[cfg(all(target_os = "windows", target_env = "msvc"))]
            LinkError::MsvcLinkerNotFound { msvc_arch } => write!(
                f,
                "failed to find MSVC linker (link.exe) for target architecture '{}'. Install Visual Studio Build Tools with C++ build tools.",
                msvc_arch
            ),
            LinkError::Failed {
                exit_code,
                stdout,
                stderr,
            } => {
                write!(f, "linker failed with exit code {}", exit_code)?;
                if !stdout.is_empty() {
                    write!(f, "\n[stdout]\n{}", stdout)?;
                }
                if !stderr.is_empty() {
                    write!(f, "\n[stderr]\n{}", stderr)?;
                }
                Ok(())
            }
        }
    }
}

fn map_linker_setup_error(error: LinkerSetupError) -> CompileError {
    match error {
        LinkerSetupError::CurrentExecutablePathResolutionFailed(source) => {
            CompileError::Link(LinkError::CurrentExecutablePathResolutionFailed(source))
        }
        LinkerSetupError::ExecutablePathParentNotFound { executable } => {
            CompileError::Link(LinkError::CurrentExecutableParentNotFound { executable })
        }
        LinkerSetupError::RuntimeLibraryNotFound { executable, path } => {
            CompileError::Link(LinkError::RuntimeLibraryNotFound { executable, path })
        }
        LinkerSetupError::RuntimeLibraryNotAFile { executable, path } => {
            CompileError::Link(LinkError::RuntimeLibraryNotAFile { executable, path })
        }
        LinkerSetupError::RuntimeLibraryAccessFailed {
            executable,
            path,
            source,
        } => CompileError::Link(LinkError::RuntimeLibraryAccessFailed {
            executable,
            path,
            source,
        }),
        #[cfg(all(target_os = "windows", target_env = "msvc"))]
        LinkerSetupError::UnsupportedMsvcArchitecture { arch } => {
            CompileError::Link(LinkError::UnsupportedMsvcArchitecture { arch })
        }
        #[cfg(all(target_os = "windows", target_env = "msvc"))]
        LinkerSetupError::MsvcLinkerNotFound { msvc_arch } => {
            CompileError::Link(LinkError::MsvcLinkerNotFound { msvc_arch })
        }
    }
}

/// Links the assembly `llc` produced into an executable against the Tony
/// runtime library.
pub(super) fn link(assembly_path: &Path, output_path: &Path, echo_commands: bool) -> Result<(), CompileError> {
    let assembly_str = assembly_path
        .to_str()
        .ok_or_else(|| CompileError::path_not_utf8(assembly_path, "Assembly file"))?;
    let output_str = output_path
        .to_str()
        .ok_or_else(|| CompileError::path_not_utf8(output_path, "Output file"))?;
    let runtime_path = resolve_runtime_library_path_from_current_exe().map_err(map_linker_setup_error)?;
    let runtime_str = runtime_path
        .to_str()
        .ok_or_else(|| CompileError::path_not_utf8(&runtime_path, "Tony runtime library"))?;

    let mut cmd =
        create_linker_command(assembly_str, runtime_str, output_str).map_err(map_linker_setup_error)?;

    if echo_commands {
        println!("{}", format_command(&cmd));
    }

    let output = cmd
        .output()
        .map_err(|e| CompileError::Link(LinkError::ExecutionFailed(e)))?;

    if !output.status.success() {
        return Err(CompileError::Link(LinkError::Failed {
            exit_code: super::format_exit_status(&output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }));
    }

    Ok(())
}
