fn main() -> Result<(), Box<dyn std::error::Error>> {
    guardian::cli::main()
}
