pub fn run() -> anyhow::Result<()> {
    println!("researchflow {}", env!("CARGO_PKG_VERSION"));
    println!("Conversational article search and document chat");
    Ok(())
}
