fn main() {
    gazebrowse_lib::run()
}
