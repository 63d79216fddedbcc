fn main() {
    nutrislice_lib::run()
}
