static BLACKLIST: &[&str] = &[
    "arsehole", "asshole", "bastard", "bitch", "bollocks", "bullshit", "cock", "cunt", "dickhead", "fuck", "motherfucker", "nigger", "nazi", "pussy",
    "retard", "shit", "slut", "twat", "wanker", "whore",
];

fn unleet(c: char) -> char {
    match c {
        '0' => 'o',
        '1' | '!' => 'i',
        '3' => 'e',
        '4' | '@' => 'a',
        '5' | '$' => 's',
        '7' => 't',
        c => c,
    }
}

fn canonical(text: &str) -> String {
    text.to_lowercase().chars().map(unleet).filter(|c| c.is_alphanumeric()).collect()
}

pub fn contains_profanity(text: &str) -> bool {
    let text = canonical(text);
    BLACKLIST.iter().any(|w| text.contains(w))
}
