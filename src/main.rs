use snowglobe::Viewer;

fn main() {
    if let Err(e) = Viewer::new().with_title("Snow Globe").run() {
        eprintln!("Viewer failed: {}", e);
        std::process::exit(1);
    }
}
