use super::layout;
use crate::service::Dashboard;

pub fn home(counts: &Dashboard) -> String {
    let content = format!(
        "<p>Welcome to <em>LocalLibrary</em>, a very basic library catalog.</p>\
         <h2>Dynamic content</h2>\
         <p>The library has the following record counts:</p>\
         <ul>\
         <li><strong>Books:</strong> {}</li>\
         <li><strong>Copies:</strong> {}</li>\
         <li><strong>Copies available:</strong> {}</li>\
         <li><strong>Authors:</strong> {}</li>\
         <li><strong>Genres:</strong> {}</li>\
         </ul>",
        counts.books, counts.copies, counts.copies_available, counts.authors, counts.genres
    );
    layout("Local Library Home", &content)
}
