/// Build the completion prompt that asks the model to identify a song
/// from a free-text description and answer in a fixed labeled template.
pub fn build_prompt(query: &str) -> String {
    format!(
        r#"
You are an expert music and song database. A user has provided the following input about a song:

"{query}"

Based on this input (which could be a song name, partial lyrics, broken sentences, or fragments), identify the song and provide comprehensive information in the following format:

**Song Name:** [Full name of the song]
**Movie/Album:** [Name of movie/album if applicable, otherwise mention "Independent Single" or artist album name]
**Artist(s):** [Singer(s) and music composer]
**Year:** [Release year]
**Language:** [Language of the song]
**Genre:** [Music genre]

**Description:**
[Provide a 3-4 sentence description about the song, its popularity, context in the movie (if applicable), and why it's memorable]

**Key Lyrics:**
[Provide 2-3 lines of the most famous/recognizable lyrics from this song]

**Trivia:**
[Share 1-2 interesting facts about this song]

If you cannot identify the song with certainty, provide your best guess with a confidence level and explain what information would help narrow it down.
"#
    )
}
