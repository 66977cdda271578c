fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    // Build number is the commit count; builds outside a git checkout report 0.
    let build_number = std::process::Command::new("git")
        .args(["rev-list", "--count", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(0);

    println!("cargo:rustc-env=ESC32_BUILD_NUMBER={build_number}");
}
