fn main() {
    terrain_prep::cli::run();
}
