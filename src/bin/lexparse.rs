fn main() {
    lexparse::cli::run();
}
