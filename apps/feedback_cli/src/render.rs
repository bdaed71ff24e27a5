use feedback_client::{
    validation::ValidationErrorMap, ListingController, Navigation, NotificationChannel,
};

pub fn field_errors(errors: &ValidationErrorMap) {
    for (field, message) in errors.iter() {
        println!("  {field}: {message}");
    }
}

pub fn navigation(next: Option<Navigation>) {
    let Some(next) = next else {
        return;
    };
    let view = match next {
        Navigation::SignIn => "sign-in",
        Navigation::Listing => "feedback list",
        Navigation::SubmissionForm => "feedback form",
    };
    println!("-> {view}");
}

pub async fn notices(channel: &NotificationChannel) {
    for alert in channel.active().await {
        println!("[{}] {}", alert.kind.title(), alert.message);
    }
    if let Some(banner) = channel.banner().await {
        println!("{}", banner.message);
    }
}

pub fn listing(listing: &ListingController) {
    let pagination = listing.pagination();
    let rows = listing.visible_records();
    if rows.is_empty() {
        println!("No feedback on this page.");
    }
    for record in rows {
        println!(
            "{:>6}  {:<32}  {:<18}  {:<24}  {}/5",
            record.feedback_id.0,
            record.title,
            record.category,
            record.author_display(),
            record.rating
        );
    }
    println!(
        "page {} of {} ({} per page, {} total)",
        pagination.page() + 1,
        listing.page_count().max(1),
        pagination.page_size(),
        listing.records().len()
    );
}
