use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the four progression tracks shown on a profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Skill {
    TheoryMaster,
    PracticePro,
    QuizChampion,
    CommunityStar,
}

impl Skill {
    pub const ALL: [Skill; 4] = [
        Skill::TheoryMaster,
        Skill::PracticePro,
        Skill::QuizChampion,
        Skill::CommunityStar,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Skill::TheoryMaster => "Theory Master",
            Skill::PracticePro => "Practice Pro",
            Skill::QuizChampion => "Quiz Champion",
            Skill::CommunityStar => "Community Star",
        }
    }
}

/// The activity category an XP award is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum SkillBranch {
    Theory,
    Practice,
    Quiz,
    Community,
    All,
}

impl SkillBranch {
    /// The single track this branch feeds, `None` for `All`.
    pub fn skill(&self) -> Option<Skill> {
        match self {
            SkillBranch::Theory => Some(Skill::TheoryMaster),
            SkillBranch::Practice => Some(Skill::PracticePro),
            SkillBranch::Quiz => Some(Skill::QuizChampion),
            SkillBranch::Community => Some(Skill::CommunityStar),
            SkillBranch::All => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SkillTrack {
    pub progress: i32,
    pub rank: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SkillTree {
    pub theory_master: SkillTrack,
    pub practice_pro: SkillTrack,
    pub quiz_champion: SkillTrack,
    pub community_star: SkillTrack,
}

impl SkillTree {
    pub fn track(&self, skill: Skill) -> &SkillTrack {
        match skill {
            Skill::TheoryMaster => &self.theory_master,
            Skill::PracticePro => &self.practice_pro,
            Skill::QuizChampion => &self.quiz_champion,
            Skill::CommunityStar => &self.community_star,
        }
    }

    pub fn track_mut(&mut self, skill: Skill) -> &mut SkillTrack {
        match skill {
            Skill::TheoryMaster => &mut self.theory_master,
            Skill::PracticePro => &mut self.practice_pro,
            Skill::QuizChampion => &mut self.quiz_champion,
            Skill::CommunityStar => &mut self.community_star,
        }
    }
}

pub const MAX_RATING: i32 = 1_000_000;

fn default_level() -> i32 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub rating: i32,
    #[serde(default = "default_level")]
    pub level: i32,
    #[serde(default)]
    pub current_xp: i64,
    #[serde(default)]
    pub total_xp: i64,
    #[serde(default)]
    pub skills: SkillTree,
    #[serde(default)]
    pub current_streak: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub achievements: Vec<String>,
    /// Quiz questions already answered correctly; only the first answer is rewarded.
    #[serde(default)]
    pub solved_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    // Bumped on every save; used for optimistic concurrency.
    #[serde(default)]
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(username: &str, email: &str, password_hash: &str) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_lowercase(),
            password_hash: password_hash.to_string(),
            rating: 0,
            level: 1,
            current_xp: 0,
            total_xp: 0,
            skills: SkillTree::default(),
            current_streak: 0,
            last_activity_at: None,
            achievements: Vec::new(),
            solved_questions: Vec::new(),
            avatar_url: None,
            version: 0,
            created_at: Some(Utc::now()),
        }
    }

    pub fn has_achievement(&self, achievement: &str) -> bool {
        self.achievements.iter().any(|a| a == achievement)
    }
}
