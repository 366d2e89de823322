use std::{error::Error, fs::File, io::Write, path::Path};

fn write_args(workdir: &Path) -> std::io::Result<()> {
    let mut file = File::create(workdir.join("args"))?;
    for arg in std::env::args().skip(1) {
        file.write_all(arg.as_bytes())?;
        file.write_all(b"\n")?;
    }
    Ok(())
}

fn get_exit_status(workdir: &Path) -> Result<i32, Box<dyn Error>> {
    let exit_status = std::fs::read_to_string(workdir.join("exit-status"))?
        .trim()
        .parse()?;
    Ok(exit_status)
}

fn copy_stdout(workdir: &Path) -> std::io::Result<()> {
    let mut file = File::open(workdir.join("stdout"))?;
    std::io::copy(&mut file, &mut std::io::stdout())?;
    Ok(())
}

pub fn test_binary_main() {
    let workdir = std::env::args_os()
        .next()
        .map(std::path::PathBuf::from)
        .and_then(|exe| exe.parent().map(Path::to_owned))
        .unwrap();
    let _ = write_args(&workdir);
    let _ = copy_stdout(&workdir);

    let exit_status = get_exit_status(&workdir).unwrap_or(0);
    std::process::exit(exit_status);
}
