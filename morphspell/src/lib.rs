/*! Spell-checking, correction and morphological analysis over Hunspell-format
affix (`.aff`) and dictionary (`.dic`) files.

An affix file describes prefix and suffix rules keyed by flags, along with
compounding, replacement and casing directives. A dictionary lists base words
with the flags they accept. Opening a [`Session`] compiles both once; every
later check, suggestion, analysis or runtime dictionary change runs against
the compiled tables.

# Usage examples

```no_run
use morphspell::Session;

let session = Session::open("en_US.dic", "en_US.aff", None)?;

for word in &["words", "wrods"] {
    if !session.is_correct(word)? {
        for suggestion in session.suggest(word)? {
            println!("{} -> {}", word, suggestion.value());
        }
    }
}

session.close();
# Ok::<(), Box<dyn std::error::Error>>(())
```

The `morphspell-bin` crate in the same workspace is a command line front
end over this library.
*/

pub mod affix;
pub mod archive;
pub mod constants;
pub mod dictionary;
pub mod encoding;
pub mod morph;
pub mod overlay;
pub mod paths;
pub mod session;
pub mod speller;
pub mod tokenizer;
pub mod types;
pub mod vfs;

pub use crate::session::Session;
