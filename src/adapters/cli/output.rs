use crate::domain::Comment;

pub fn format_comment(comment: &Comment) -> String {
    let mut out = format!(
        "#{} {} • {} • {} • 👍 {}",
        comment.id,
        comment.author,
        comment.time_since_created(),
        comment.date_display(),
        comment.likes
    );
    for line in comment.text.lines() {
        out.push_str("\n    ");
        out.push_str(line);
    }
    out
}

pub fn print_comments(comments: &[Comment]) {
    if comments.is_empty() {
        println!("No comments yet. Be the first!");
        return;
    }

    for comment in comments {
        println!("{}\n", format_comment(comment));
    }
}
