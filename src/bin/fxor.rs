#[cfg(unix)]
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;

use clap::Parser;
use clap::error::ErrorKind;

use xor_rs::common::io::{create_output, open_input};
use xor_rs::common::io_error_msg;
use xor_rs::xor::{Key, StreamTransformer, TransformError};

#[derive(Parser)]
#[command(
    name = "fxor",
    about = "XOR INPUT against a fixed repeating key and write the result to OUTPUT.",
    after_help = "The key is 0xDEADBEEF replicated across a 256-bit vector. XOR is its\n\
        own inverse: running fxor on its own output restores the original data.\n\
        Use - for standard input or standard output.",
    override_usage = "fxor inputFile outputFile",
    version
)]
struct Cli {
    /// File to read
    input: String,

    /// File to create or truncate
    output: String,
}

/// Enlarge pipe buffers on Linux for higher throughput.
/// Only called when stdin or stdout is actually in use.
#[cfg(target_os = "linux")]
fn enlarge_pipes() {
    for &fd in &[0i32, 1] {
        for &size in &[8 * 1024 * 1024i32, 1024 * 1024, 256 * 1024] {
            if unsafe { libc::fcntl(fd, libc::F_SETPIPE_SZ, size) } > 0 {
                break;
            }
        }
    }
}

/// Owned handle on fd 1 so stdout can be written without the
/// line-buffered StdoutLock.
#[cfg(unix)]
fn stdout_file() -> io::Result<File> {
    use std::os::unix::io::FromRawFd;
    let fd = unsafe { libc::dup(1) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { File::from_raw_fd(fd) })
}

fn open_reader(name: &str) -> io::Result<Box<dyn Read>> {
    if name == "-" {
        Ok(Box::new(io::stdin()))
    } else {
        Ok(Box::new(open_input(Path::new(name))?))
    }
}

fn open_writer(name: &str) -> io::Result<Box<dyn Write>> {
    if name == "-" {
        #[cfg(unix)]
        {
            return Ok(Box::new(stdout_file()?));
        }
        #[cfg(not(unix))]
        {
            return Ok(Box::new(io::stdout()));
        }
    }
    Ok(Box::new(create_output(Path::new(name))?))
}

fn input_name(name: &str) -> &str {
    if name == "-" { "standard input" } else { name }
}

fn output_name(name: &str) -> &str {
    if name == "-" { "standard output" } else { name }
}

fn main() {
    xor_rs::common::reset_sigpipe();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                process::exit(1);
            }
        },
    };

    #[cfg(target_os = "linux")]
    {
        if cli.input == "-" || cli.output == "-" {
            enlarge_pipes();
        }
    }

    let mut input = match open_reader(&cli.input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("fxor: {}: {}", input_name(&cli.input), io_error_msg(&e));
            process::exit(1);
        }
    };
    let mut output = match open_writer(&cli.output) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("fxor: {}: {}", output_name(&cli.output), io_error_msg(&e));
            process::exit(1);
        }
    };

    let mut transformer = StreamTransformer::new(Key::default());
    match transformer.run(&mut input, &mut output) {
        Ok(stats) => {
            drop(output);
            eprint!("{}", stats);
        }
        Err(TransformError::Read(e)) => {
            eprintln!("fxor: {}: {}", input_name(&cli.input), io_error_msg(&e));
            process::exit(1);
        }
        Err(TransformError::Write(e)) => {
            if e.kind() == io::ErrorKind::BrokenPipe {
                process::exit(0);
            }
            eprintln!("fxor: write error: {}", io_error_msg(&e));
            process::exit(1);
        }
    }
}
