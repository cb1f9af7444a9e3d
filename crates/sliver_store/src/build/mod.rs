use crate::utils::TempDir;
use log::info;
use sliver_core::config::Config;
use sliver_core::error::{Error, Result};
use sliver_core::utils::base_name;
use std::collections::BTreeMap;
use std::ffi::CString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::fd::FromRawFd;
use std::ptr;

/// A Unix environment: a mapping from names to values.
pub type Environment = BTreeMap<String, String>;

/// Run `builder` as a child process in a fresh private working directory,
/// with exactly `env` as its environment and the basename of `builder` as
/// its only argument. The child's stdout and stderr are appended to the
/// shared run log and forwarded to this process's stderr. Returns only if
/// the child exited with status 0.
pub fn run_program(config: &Config, builder: &str, env: &Environment) -> Result<()> {
    let fail = |reason: &str| Error::Build {
        builder: builder.to_string(),
        reason: reason.to_string(),
    };

    let mut log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.run_log_path())?;

    fs::create_dir_all(&config.scratch_dir)?;
    let work_dir = TempDir::create_in(&config.scratch_dir)?;

    // Everything the child needs is prepared before the fork; between
    // fork and exec it only makes raw syscalls.
    let prog = cstring(builder)?;
    let argv0 = cstring(base_name(builder))?;
    let argv = [argv0.as_ptr(), ptr::null()];
    let env_strs = env
        .iter()
        .map(|(name, value)| cstring(&format!("{name}={value}")))
        .collect::<Result<Vec<_>>>()?;
    let mut envp = env_strs.iter().map(|s| s.as_ptr()).collect::<Vec<_>>();
    envp.push(ptr::null());
    let cwd = cstring(&work_dir.path().to_string_lossy())?;

    let mut fds = [0 as libc::c_int; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } == -1 {
        return Err(fail("cannot create the log pipe"));
    }
    let (read_fd, write_fd) = (fds[0], fds[1]);

    info!("running builder {builder}");

    match unsafe { libc::fork() } {
        -1 => {
            unsafe {
                libc::close(read_fd);
                libc::close(write_fd);
            }
            Err(fail("unable to fork"))
        }

        0 => unsafe {
            // child
            if libc::chdir(cwd.as_ptr()) == -1 {
                die(b"sliver: cannot enter the working directory\n");
            }
            if libc::dup2(write_fd, libc::STDOUT_FILENO) == -1
                || libc::dup2(write_fd, libc::STDERR_FILENO) == -1
            {
                die(b"sliver: cannot redirect builder output\n");
            }
            libc::close(read_fd);
            libc::close(write_fd);
            if libc::chmod(prog.as_ptr(), 0o755) == -1 {
                die(b"sliver: cannot make the builder executable\n");
            }
            libc::execve(prog.as_ptr(), argv.as_ptr(), envp.as_ptr());
            die(b"sliver: cannot execute the builder\n")
        },

        pid => {
            unsafe {
                libc::close(write_fd);
            }

            // Drain the child's output into the run log and our stderr,
            // then collect its exit status. Forwarding is best-effort;
            // only the exit status decides the build.
            let mut pipe = unsafe { File::from_raw_fd(read_fd) };
            let mut buff = [0u8; 8192];
            loop {
                match pipe.read(&mut buff) {
                    Ok(0) => break,
                    Ok(n) => {
                        let _ = log_file.write_all(&buff[..n]);
                        let _ = std::io::stderr().write_all(&buff[..n]);
                    }
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }

            let mut status = 0 as libc::c_int;
            if unsafe { libc::waitpid(pid, &mut status, 0) } != pid {
                return Err(fail("unable to wait for the child"));
            }
            if !libc::WIFEXITED(status) || libc::WEXITSTATUS(status) != 0 {
                return Err(fail("builder exited with a failure"));
            }
            Ok(())
        }
    }
}

fn cstring(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::Store(format!("string `{s}' contains a NUL byte")))
}

/// Report a setup failure on the child's (redirected) stderr and bail out
/// with status 1. Only async-signal-safe calls.
unsafe fn die(msg: &[u8]) -> ! {
    unsafe {
        libc::write(
            libc::STDERR_FILENO,
            msg.as_ptr().cast::<libc::c_void>(),
            msg.len(),
        );
        libc::_exit(1)
    }
}
