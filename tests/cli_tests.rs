//! Runs the `tvm-build` binary against shell-script stand-ins for the toolchain.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

const FAKE_TOOL: &str = r#"#!/bin/sh
name=$(basename "$0")
if [ "$FAIL_TOOL" = "$name" ]; then
  echo "fatal: $name exploded"
  exit 2
fi
if [ "$WARN_TOOL" = "$name" ]; then
  echo "warning: $name noticed something" >&2
fi
if [ "$1" = "decode" ]; then
  echo "decoded:"
  echo " code: C0FFEE"
  exit 0
fi
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
if [ -n "$out" ]; then
  echo "; $name" > "$out"
else
  echo "boc" > contract.tvc
fi
"#;

fn install_fake_toolchain(bin: &Path) {
    fs::create_dir_all(bin).unwrap();
    for tool in ["clang", "clang++", "llvm-as", "llvm-link", "opt", "llc", "tvm_linker"] {
        let path = bin.join(tool);
        fs::write(&path, FAKE_TOOL).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

fn tvm_build(work: &Path, bin: &Path, args: &[&str], fail_tool: &str) -> Output {
    tvm_build_with(work, bin, args, fail_tool, "")
}

fn tvm_build_with(
    work: &Path,
    bin: &Path,
    args: &[&str],
    fail_tool: &str,
    warn_tool: &str,
) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tvm-build"))
        .current_dir(work)
        .env("TVM_LLVM_BINARY_DIR", bin)
        .env("TVM_LINKER", bin.join("tvm_linker"))
        .env("TVM_LIBRARY_PATH", bin.join("../lib"))
        .env("TVM_INCLUDE_PATH", bin.join("../include"))
        .env("FAIL_TOOL", fail_tool)
        .env("WARN_TOOL", warn_tool)
        .args(args)
        .output()
        .unwrap()
}

// Scenarios share one test so no other thread forks while scripts are being written.
#[test]
fn binary_end_to_end() {
    let root = tempfile::tempdir().unwrap();
    let bin = root.path().join("toolchain/bin");
    install_fake_toolchain(&bin);
    let work = root.path().join("work");
    fs::create_dir_all(&work).unwrap();
    fs::write(work.join("wallet.cpp"), "int main_external() { return 0; }\n").unwrap();
    fs::write(work.join("wallet.abi"), "{}\n").unwrap();

    // Success with an explicit output: contract plus code sidecar.
    let args = ["-A", "wallet.abi", "-o", "wallet.boc", "wallet.cpp"];
    let out = tvm_build(&work, &bin, &args, "");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout.contains("Build succeeded."));
    assert_eq!(fs::read_to_string(work.join("wallet.boc")).unwrap(), "; tvm_linker\n");
    assert_eq!(fs::read_to_string(work.join("wallet.boc.code")).unwrap(), "C0FFEE");

    // Verbose echo shows the exact command lines.
    let out = tvm_build(&work, &bin, &["-v", "-A", "wallet.abi", "-S", "wallet.cpp"], "");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success());
    assert!(stdout.contains("clang++ -target tvm -O3 -S -emit-llvm wallet.cpp -o "));
    assert!(stdout.contains("llc -march tvm "));
    assert!(work.join("wallet.s").exists());

    // Warnings from a tool that succeeds still reach the user.
    let out = tvm_build_with(&work, &bin, &["-A", "wallet.abi", "-S", "wallet.cpp"], "", "opt");
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("warning: opt noticed something"), "stderr: {stderr}");

    // Save-temps assembly-only output naming the llc artifact itself keeps its contents.
    let out = tvm_build(
        &work,
        &bin,
        &["--save-temps", "-A", "wallet.abi", "-S", "-o", "5-llc.asm", "wallet.cpp"],
        "",
    );
    assert!(out.status.success());
    assert_eq!(fs::read_to_string(work.join("5-llc.asm")).unwrap(), "; llc\n");
    for name in ["1-clang.ll", "2-llvm-link.ll", "3-opt.ll", "4-opt_O3.ll", "5-llc.asm"] {
        fs::remove_file(work.join(name)).unwrap();
    }

    // A failing tool: exit 1, its output echoed, nothing numbered left behind.
    let out = tvm_build(&work, &bin, &["-A", "wallet.abi", "wallet.cpp"], "llc");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout.contains("fatal: llc exploded"));
    assert!(!stdout.contains("Build succeeded."));

    // Unsupported input kind.
    let out = tvm_build(&work, &bin, &["-A", "wallet.abi", "wallet.rs"], "");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Unsupported input file extension: wallet.rs"));

    let leftovers: Vec<_> = fs::read_dir(&work)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(|c: char| c.is_ascii_digit()))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[test]
fn missing_configuration_is_reported() {
    let work = tempfile::tempdir().unwrap();
    fs::write(work.path().join("a.cpp"), "").unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_tvm-build"))
        .current_dir(work.path())
        .env_remove("TVM_LLVM_BINARY_DIR")
        .env_remove("TVM_LINKER")
        .env_remove("TVM_LIBRARY_PATH")
        .env_remove("TVM_INCLUDE_PATH")
        .args(["-A", "a.abi", "a.cpp"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr)
        .contains("Use --llvm-bin option or set TVM_LLVM_BINARY_DIR environment variable"));
}
