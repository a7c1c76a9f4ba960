use std::path::{Path, PathBuf};

use language_tags::LanguageTag;

const SYSTEM_DIRS: &[&str] = &[
    "/usr/share/hunspell",
    "/usr/share/myspell",
    "/usr/share/myspell/dicts",
    "/usr/local/share/hunspell",
    "/Library/Spelling",
];

/// Directories searched for dictionaries, `$DICPATH` first.
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::env::var_os("DICPATH")
        .map(|paths| std::env::split_paths(&paths).collect())
        .unwrap_or_default();

    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(Path::new(&home).join("Library/Spelling"));
        dirs.push(Path::new(&home).join(".local/share/hunspell"));
    }

    dirs.extend(SYSTEM_DIRS.iter().map(PathBuf::from));
    dirs
}

/// Base names to try for `tag`, most specific first.
fn candidate_names(tag: &LanguageTag) -> Vec<String> {
    let lang = tag.primary_language();
    match tag.region() {
        Some(region) => vec![
            format!("{}_{}", lang, region),
            format!("{}-{}", lang, region),
            lang.to_string(),
        ],
        None => vec![lang.to_string()],
    }
}

fn find_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let pattern = format!("{}.dic", name);
    globwalk::GlobWalkerBuilder::new(dir, &pattern)
        .max_depth(1)
        .case_insensitive(true)
        .build()
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path().to_path_buf())
        .find(|dic| dic.with_extension("aff").is_file())
}

/// Finds a `.dic`/`.aff` pair for `tag` in `dirs`.
pub fn find_dictionary_in(dirs: &[PathBuf], tag: &LanguageTag) -> Option<(PathBuf, PathBuf)> {
    for name in candidate_names(tag) {
        for dir in dirs.iter().filter(|d| d.is_dir()) {
            if let Some(dic) = find_in(dir, &name) {
                log::debug!("found {} for {}", dic.display(), tag);
                let aff = dic.with_extension("aff");
                return Some((dic, aff));
            }
        }
    }
    None
}

/// Finds a `.dic`/`.aff` pair for `tag` in the [`search_dirs`].
pub fn find_dictionary(tag: &LanguageTag) -> Option<(PathBuf, PathBuf)> {
    find_dictionary_in(&search_dirs(), tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_before_language() {
        let dir = tempfile::tempdir().unwrap();
        for name in &["en.dic", "en.aff", "en_GB.dic", "en_GB.aff", "en_US.dic"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let dirs = vec![dir.path().to_path_buf()];

        let gb: LanguageTag = "en-GB".parse().unwrap();
        let (dic, aff) = find_dictionary_in(&dirs, &gb).unwrap();
        assert_eq!(dic.file_name().unwrap(), "en_GB.dic");
        assert_eq!(aff.file_name().unwrap(), "en_GB.aff");

        // en_US has no affix file
        let us: LanguageTag = "en-US".parse().unwrap();
        let (dic, _) = find_dictionary_in(&dirs, &us).unwrap();
        assert_eq!(dic.file_name().unwrap(), "en.dic");

        let fr: LanguageTag = "fr".parse().unwrap();
        assert!(find_dictionary_in(&dirs, &fr).is_none());
    }
}
