fn main() {
    let tag_arg = match std::env::args().nth(1) {
        Some(v) => v,
        None => {
            eprintln!("No tag passed.");
            return;
        }
    };

    let tag = match tag_arg.parse() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid tag: {:?}", e);
            return;
        }
    };

    match morphspell::paths::find_dictionary(&tag) {
        Some((dic, aff)) => println!("Found: {} ({})", dic.display(), aff.display()),
        None => println!("Not found!"),
    }
}
