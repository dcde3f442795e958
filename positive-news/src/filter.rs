/// Title fragments that mark a story as not worth a classifier call:
/// crime, accidents, politics, war, opinion pieces and sports.
pub const STOP_WORDS: &[&str] = &[
    "vražda", "zabil", "zemřel", "úmrtí", "nehoda", "tragédie", "požár",
    "soud", "vězení", "policie", "krimi", "zloděj", "podvod",
    "babiš", "fiala", "okamura", "pavel", "sněmovna", "vláda", "volby",
    "válka", "rusko", "ukrajina", "izrael", "gaza", "útok", "zbraně",
    "recenze", "komentář", "glosa", "sport", "hokej", "fotbal", "liga",
];

/// Cheap keyword pre-filter run before the classifier.
///
/// Case-insensitive substring match; any stop word in the title rejects it.
pub fn is_worth_checking(title: &str) -> bool {
    let title_lower = title.to_lowercase();
    !STOP_WORDS.iter().any(|word| title_lower.contains(word))
}
