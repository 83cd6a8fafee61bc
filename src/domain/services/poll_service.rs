use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::models::{
    form::{is_valid_email, validate_values},
    poll::{Poll, PollOption, Vote, VoteResponse, VoteTally},
    user::Organizer,
};
use crate::domain::ports::{Notifier, PollRepository, VoteRepository};
use crate::error::AppError;

/// Counts responses per option, in the order the options are given.
/// Responses naming an option outside `options` are ignored.
pub fn tally(options: &[PollOption], votes: &[Vote]) -> Vec<VoteTally> {
    let mut tallies: Vec<VoteTally> = options.iter().map(|o| VoteTally::empty(o.id.clone())).collect();
    let index: HashMap<&str, usize> = options.iter().enumerate().map(|(i, o)| (o.id.as_str(), i)).collect();

    for vote in votes {
        for (option_id, response) in &vote.responses {
            if let Some(&i) = index.get(option_id.as_str()) {
                tallies[i].record(*response);
            }
        }
    }

    tallies
}

#[derive(Debug, Clone)]
pub struct VoteRequest {
    pub guest_email: Option<String>,
    pub guest_name: Option<String>,
    pub responses: BTreeMap<String, VoteResponse>,
    pub custom_fields: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct PollResults {
    pub tallies: Vec<VoteTally>,
    pub votes: Vec<Vote>,
}

pub struct PollService {
    polls: Arc<dyn PollRepository>,
    votes: Arc<dyn VoteRepository>,
    notifier: Arc<dyn Notifier>,
}

impl PollService {
    pub fn new(polls: Arc<dyn PollRepository>, votes: Arc<dyn VoteRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self { polls, votes, notifier }
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<(Poll, Vec<PollOption>), AppError> {
        let poll = self.polls.find_by_slug(slug).await?
            .ok_or(AppError::NotFound("Poll not found".into()))?;
        let mut options = self.polls.list_options(&poll.id).await?;
        options.sort_by(|a, b| (a.start_time, a.end_time).cmp(&(b.start_time, b.end_time)));
        Ok((poll, options))
    }

    pub async fn find_owned(&self, poll_id: &str, organizer: &Organizer) -> Result<Poll, AppError> {
        let poll = self.polls.find_by_id(poll_id).await?
            .ok_or(AppError::NotFound("Poll not found".into()))?;
        if poll.owner_id != organizer.id {
            return Err(AppError::Forbidden("Not your poll".into()));
        }
        Ok(poll)
    }

    pub async fn submit_vote(&self, slug: &str, request: VoteRequest) -> Result<Vote, AppError> {
        let poll = self.polls.find_by_slug(slug).await?
            .ok_or(AppError::NotFound("Poll not found".into()))?;

        if poll.is_closed() {
            return Err(AppError::Conflict("Poll is closed".into()));
        }

        let guest_email = request.guest_email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        match &guest_email {
            Some(email) if !is_valid_email(email) => {
                return Err(AppError::Validation("Invalid email address".into()));
            }
            None if poll.require_email => {
                return Err(AppError::Validation("Email is required for this poll".into()));
            }
            _ => {}
        }

        let custom_fields = validate_values(&poll.custom_fields, &request.custom_fields)?;

        let vote = Vote::new(
            poll.id.clone(),
            guest_email,
            request.guest_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            request.responses,
            custom_fields,
        );

        let created = self.votes.create(&vote).await?;
        info!("Vote {} recorded on poll {}", created.id, poll.slug);
        Ok(created)
    }

    /// Public results, only when the organizer opted in. Voter emails are withheld.
    pub async fn results(&self, slug: &str) -> Result<PollResults, AppError> {
        let (poll, options) = self.find_by_slug(slug).await?;
        if !poll.show_results {
            return Err(AppError::Forbidden("Results not public".into()));
        }
        let mut results = self.collect_results(&poll, &options).await?;
        for vote in &mut results.votes {
            vote.guest_email = None;
        }
        Ok(results)
    }

    pub async fn owner_results(&self, poll_id: &str, organizer: &Organizer) -> Result<PollResults, AppError> {
        let poll = self.find_owned(poll_id, organizer).await?;
        let mut options = self.polls.list_options(&poll.id).await?;
        options.sort_by(|a, b| (a.start_time, a.end_time).cmp(&(b.start_time, b.end_time)));
        self.collect_results(&poll, &options).await
    }

    /// Closes the poll on `option_id` and tells every voter who left an email.
    pub async fn pick_winner(&self, poll_id: &str, option_id: &str, organizer: &Organizer) -> Result<Poll, AppError> {
        let poll = self.find_owned(poll_id, organizer).await?;

        let option = self.polls.list_options(&poll.id).await?
            .into_iter()
            .find(|o| o.id == option_id)
            .ok_or(AppError::NotFound("Option not found".into()))?;

        if poll.is_closed() || !self.polls.close_with_winner(&poll.id, &option.id).await? {
            return Err(AppError::Conflict("Poll is already closed".into()));
        }
        info!("Poll {} closed with winning option {}", poll.id, option.id);

        let closed = self.polls.find_by_id(&poll.id).await?
            .ok_or(AppError::NotFound("Poll not found".into()))?;

        let votes = self.votes.list_by_poll(&closed.id).await?;
        for vote in votes.iter().filter(|v| v.guest_email.is_some()) {
            if let Err(e) = self.notifier.poll_winner(&closed, &option, vote).await {
                warn!("Winner email for vote {} failed: {:?}", vote.id, e);
            }
        }

        Ok(closed)
    }

    async fn collect_results(&self, poll: &Poll, options: &[PollOption]) -> Result<PollResults, AppError> {
        let votes = self.votes.list_by_poll(&poll.id).await?;
        Ok(PollResults { tallies: tally(options, &votes), votes })
    }
}
