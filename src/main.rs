fn main() -> anyhow::Result<()> {
    kontengen_lib::run()
}
