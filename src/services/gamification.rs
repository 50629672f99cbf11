//! XP, levels, rating, streaks, skill ranks and achievements.
//!
//! [`Progression`] applies the rules to a user held in memory and records a
//! [`GamificationEvent`] for everything that changed. [`GamificationService`]
//! loads the user, runs a mutation, and saves it under the optimistic
//! version check, retrying when another request saved first.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{user::MAX_RATING, Skill, SkillBranch, User},
    repositories::UserRepository,
};

pub const SKILL_MAX: i32 = 100;
pub const RANK_UP_RATING: i32 = 30;
pub const LEVEL_UP_RATING: i32 = 10;
pub const EXPERT_RATING: i32 = 1700;
pub const MASTER_RATING: i32 = 2000;

pub const MAX_SAVE_ATTEMPTS: usize = 3;

/// (streak length, bonus XP to every track, bonus rating, achievement)
const STREAK_BONUSES: [(i32, u32, i32, &str); 3] = [
    (7, 50, 20, "Week Warrior - 7 day streak"),
    (14, 100, 50, "Fortnight Fighter - 14 day streak"),
    (30, 300, 100, "Month Master - 30 day streak"),
];

/// XP needed to leave `level`.
pub fn xp_for_next_level(level: i32) -> i64 {
    ((100 * i64::from(level)) as f64 * 1.15) as i64
}

pub fn rank_name(rating: i32) -> &'static str {
    match rating {
        r if r < 300 => "Beginner",
        r if r < 500 => "Student",
        r if r < 800 => "Developer",
        r if r < 1000 => "Professional",
        r if r < MASTER_RATING => "Expert",
        _ => "Master",
    }
}

fn skill_increase(amount: u32, branch: SkillBranch) -> i32 {
    let base = (amount / 3) as i32;
    let bonus = match branch {
        SkillBranch::Practice => 5,
        SkillBranch::Theory => 3,
        SkillBranch::Quiz => 2,
        SkillBranch::Community | SkillBranch::All => 0,
    };
    base + bonus
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamificationEvent {
    XpGained { amount: u32, branch: SkillBranch },
    LevelUp { level: i32 },
    RankUp { skill: Skill, rank: i32 },
    RatingChanged { delta: i32, rating: i32 },
    StreakChanged { streak: i32 },
    Achievement(String),
}

impl fmt::Display for GamificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamificationEvent::XpGained { amount, branch } => {
                write!(f, "gained {} XP ({:?})", amount, branch)
            }
            GamificationEvent::LevelUp { level } => write!(f, "reached level {}", level),
            GamificationEvent::RankUp { skill, rank } => {
                write!(f, "reached {} Rank {}", skill.display_name(), rank)
            }
            GamificationEvent::RatingChanged { delta, rating } => {
                write!(f, "rating {:+} to {}", delta, rating)
            }
            GamificationEvent::StreakChanged { streak } => write!(f, "streak is now {}", streak),
            GamificationEvent::Achievement(name) => write!(f, "unlocked achievement '{}'", name),
        }
    }
}

/// In-memory rule engine over a single user.
pub struct Progression<'a> {
    user: &'a mut User,
    events: Vec<GamificationEvent>,
}

impl<'a> Progression<'a> {
    pub fn new(user: &'a mut User) -> Self {
        Self {
            user,
            events: Vec::new(),
        }
    }

    pub fn user(&self) -> &User {
        &*self.user
    }

    pub fn into_events(self) -> Vec<GamificationEvent> {
        self.events
    }

    pub fn add_xp(&mut self, amount: u32, branch: SkillBranch) {
        self.user.current_xp += i64::from(amount);
        self.user.total_xp += i64::from(amount);
        self.events
            .push(GamificationEvent::XpGained { amount, branch });

        let increase = skill_increase(amount, branch);
        match branch.skill() {
            Some(skill) => self.bump_skill(skill, increase),
            None => {
                let share = (increase / 4).max(1);
                for skill in Skill::ALL {
                    self.bump_skill(skill, share);
                }
            }
        }

        self.level_up();
    }

    pub fn add_rating(&mut self, delta: i32) {
        self.user.rating = self.user.rating.saturating_add(delta).clamp(0, MAX_RATING);
        self.events.push(GamificationEvent::RatingChanged {
            delta,
            rating: self.user.rating,
        });

        if self.user.rating >= MASTER_RATING {
            self.add_achievement("Master - Reached 2000 ELO");
        } else if self.user.rating >= EXPERT_RATING {
            self.add_achievement("Expert - Reached 1700 ELO");
        }
    }

    /// Counts consecutive UTC days with activity.
    pub fn update_streak(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        let last_day = self.user.last_activity_at.map(|t| t.date_naive());
        self.user.last_activity_at = Some(now);

        let streak = match last_day {
            Some(day) if day == today => {
                if self.user.current_streak > 0 {
                    return;
                }
                1
            }
            Some(day) if today.pred_opt() == Some(day) => self.user.current_streak + 1,
            _ => 1,
        };

        if streak == self.user.current_streak {
            return;
        }
        self.user.current_streak = streak;
        self.events.push(GamificationEvent::StreakChanged { streak });

        if let Some((_, xp, rating, achievement)) = STREAK_BONUSES
            .iter()
            .find(|(days, ..)| *days == streak)
        {
            self.add_xp(*xp, SkillBranch::All);
            self.add_rating(*rating);
            self.add_achievement(achievement);
        }
    }

    /// Returns whether this is the first correct answer to the question.
    pub fn mark_question_solved(&mut self, question_id: &str) -> bool {
        if self.user.solved_questions.iter().any(|q| q == question_id) {
            return false;
        }
        self.user.solved_questions.push(question_id.to_string());
        true
    }

    pub fn add_skill_progress(&mut self, skill: Skill, increment: i32) {
        self.bump_skill(skill, increment);
    }

    /// Returns whether the achievement was new.
    pub fn add_achievement(&mut self, name: &str) -> bool {
        if self.user.has_achievement(name) {
            return false;
        }
        self.user.achievements.push(name.to_string());
        self.events
            .push(GamificationEvent::Achievement(name.to_string()));
        true
    }

    fn bump_skill(&mut self, skill: Skill, increment: i32) {
        let track = self.user.skills.track_mut(skill);
        track.progress = (track.progress + increment).clamp(0, SKILL_MAX);

        if track.progress < SKILL_MAX {
            return;
        }

        track.rank += 1;
        track.progress = 0;
        let rank = track.rank;

        self.events.push(GamificationEvent::RankUp { skill, rank });
        self.add_rating(RANK_UP_RATING);
        self.add_achievement(&format!("{} Rank {}", skill.display_name(), rank));
    }

    fn level_up(&mut self) {
        let mut needed = xp_for_next_level(self.user.level);

        while self.user.current_xp >= needed {
            self.user.current_xp -= needed;
            self.user.level += 1;
            let level = self.user.level;

            self.events.push(GamificationEvent::LevelUp { level });
            self.add_rating(LEVEL_UP_RATING);
            if level % 10 == 0 {
                self.add_achievement(&format!("Level {} Reached", level));
            }

            needed = xp_for_next_level(level);
        }
    }
}

/// Qualifying actions and what each one is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reward {
    TheoryProgress,
    PracticeProgress,
    PracticeTaskPassed,
    QuizAnsweredCorrectly,
    ThreadCreated,
    ReplyPosted,
}

impl Reward {
    pub fn reason(&self) -> &'static str {
        match self {
            Reward::TheoryProgress => "theory progress",
            Reward::PracticeProgress => "practice progress",
            Reward::PracticeTaskPassed => "practice task passed",
            Reward::QuizAnsweredCorrectly => "quiz answered correctly",
            Reward::ThreadCreated => "forum thread created",
            Reward::ReplyPosted => "forum reply posted",
        }
    }

    pub fn apply(&self, progression: &mut Progression<'_>, now: DateTime<Utc>) {
        match self {
            Reward::TheoryProgress => {
                progression.add_xp(15, SkillBranch::Theory);
                progression.add_rating(5);
                progression.update_streak(now);
                progression.add_skill_progress(Skill::TheoryMaster, 20);
            }
            Reward::PracticeProgress => {
                progression.add_xp(35, SkillBranch::Practice);
                progression.add_rating(15);
                progression.update_streak(now);
            }
            Reward::PracticeTaskPassed => {
                progression.update_streak(now);
                progression.add_skill_progress(Skill::PracticePro, 25);
            }
            Reward::QuizAnsweredCorrectly => {
                progression.add_xp(10, SkillBranch::Quiz);
                progression.add_rating(3);
                progression.update_streak(now);
            }
            Reward::ThreadCreated => {
                progression.add_xp(10, SkillBranch::Community);
                progression.add_rating(2);
                progression.update_streak(now);
            }
            Reward::ReplyPosted => {
                progression.add_xp(5, SkillBranch::Community);
                progression.add_rating(1);
                progression.update_streak(now);
            }
        }
    }
}

pub struct GamificationService {
    users: Arc<dyn UserRepository>,
}

impl GamificationService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn reward(&self, user_id: &str, reward: Reward) -> AppResult<User> {
        self.apply(user_id, reward.reason(), |progression| {
            reward.apply(progression, Utc::now())
        })
        .await
    }

    /// Loads the user, runs `mutate`, and saves. On a version conflict the
    /// user is reloaded and `mutate` runs again on the fresh copy.
    pub async fn apply<F>(&self, user_id: &str, reason: &str, mutate: F) -> AppResult<User>
    where
        F: Fn(&mut Progression<'_>) + Send + Sync,
    {
        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            let mut user = self
                .users
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))?;

            let events = {
                let mut progression = Progression::new(&mut user);
                mutate(&mut progression);
                progression.into_events()
            };

            match self.users.save(user).await? {
                Some(saved) => {
                    for event in &events {
                        log::info!("User {} {} for {}", user_id, event, reason);
                    }
                    return Ok(saved);
                }
                None => log::warn!(
                    "Version conflict saving user {} for {} (attempt {}/{})",
                    user_id,
                    reason,
                    attempt,
                    MAX_SAVE_ATTEMPTS
                ),
            }
        }

        Err(AppError::Conflict(format!(
            "User {} was modified concurrently, please retry",
            user_id
        )))
    }
}
