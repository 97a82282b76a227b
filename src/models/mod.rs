mod newsletter;
mod podcast;

pub use newsletter::{NewsletterHealth, SubscribeRequest, SubscribeResponse};
pub use podcast::{NewPodcast, Podcast, PodcastFull, PodcastUpdate, is_web_url};
