//! Typed references to the objects a result can point at.
//!
//! The ledger stores results for outcomes assessed in many places: an
//! assignment, a quiz, a rubric row. Instead of a free-form (type, id)
//! pair, each reference is a closed enum over the known kinds, so
//! handling is exhaustive at compile time and an id can never be paired
//! with the wrong kind.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a user owning results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a tracked learning outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeId(Uuid);

impl OutcomeId {
    /// Creates a new random outcome ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an outcome ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for OutcomeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OutcomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the content tag aligning an outcome to assessed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTagId(Uuid);

impl ContentTagId {
    /// Creates a new random content tag ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a content tag ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ContentTagId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContentTagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(Uuid);

impl AssignmentId {
    /// Creates a new random assignment ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an assignment ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AssignmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(Uuid);

impl QuizId {
    /// Creates a new random quiz ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a quiz ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for QuizId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a rubric association (a rubric attached to assessed content).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RubricAssociationId(Uuid);

impl RubricAssociationId {
    /// Creates a new random rubric association ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a rubric association ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RubricAssociationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RubricAssociationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Creates a new random submission ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a submission ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a quiz submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizSubmissionId(Uuid);

impl QuizSubmissionId {
    /// Creates a new random quiz submission ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a quiz submission ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for QuizSubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuizSubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a rubric assessment (one filled-in rubric).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RubricAssessmentId(Uuid);

impl RubricAssessmentId {
    /// Creates a new random rubric assessment ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a rubric assessment ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RubricAssessmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RubricAssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an assessment question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentQuestionId(Uuid);

impl AssessmentQuestionId {
    /// Creates a new random assessment question ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an assessment question ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AssessmentQuestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssessmentQuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(Uuid);

impl CourseId {
    /// Creates a new random course ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a course ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for CourseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an account (the institution-level grading context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Creates a new random account ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an account ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a result is attached to — the assessed activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssociationRef {
    /// A regular assignment.
    Assignment {
        /// The assignment's ID.
        id: AssignmentId,
    },

    /// A quiz.
    Quiz {
        /// The quiz's ID.
        id: QuizId,
    },

    /// A rubric attached to assessed content.
    RubricAssociation {
        /// The rubric association's ID.
        id: RubricAssociationId,
    },
}

impl AssociationRef {
    /// Creates an assignment association.
    #[must_use]
    pub const fn assignment(id: AssignmentId) -> Self {
        Self::Assignment { id }
    }

    /// Creates a quiz association.
    #[must_use]
    pub const fn quiz(id: QuizId) -> Self {
        Self::Quiz { id }
    }

    /// Creates a rubric association.
    #[must_use]
    pub const fn rubric_association(id: RubricAssociationId) -> Self {
        Self::RubricAssociation { id }
    }

    /// The snake_case kind tag of this association.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Assignment { .. } => "assignment",
            Self::Quiz { .. } => "quiz",
            Self::RubricAssociation { .. } => "rubric_association",
        }
    }

    /// Returns the assignment ID when this association is an assignment.
    #[must_use]
    pub const fn assignment_id(&self) -> Option<AssignmentId> {
        match self {
            Self::Assignment { id } => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for AssociationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assignment { id } => write!(f, "assignment_{id}"),
            Self::Quiz { id } => write!(f, "quiz_{id}"),
            Self::RubricAssociation { id } => write!(f, "rubric_association_{id}"),
        }
    }
}

/// What produced the score — the graded artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactRef {
    /// A student submission.
    Submission {
        /// The submission's ID.
        id: SubmissionId,
    },

    /// A completed quiz submission.
    QuizSubmission {
        /// The quiz submission's ID.
        id: QuizSubmissionId,
    },

    /// A filled-in rubric. Carries the assessed assignment when known so
    /// the assignment can be resolved without a store lookup.
    RubricAssessment {
        /// The rubric assessment's ID.
        id: RubricAssessmentId,
        /// The assignment the rubric was assessing, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        assignment: Option<AssignmentId>,
    },
}

impl ArtifactRef {
    /// Creates a submission artifact.
    #[must_use]
    pub const fn submission(id: SubmissionId) -> Self {
        Self::Submission { id }
    }

    /// Creates a quiz submission artifact.
    #[must_use]
    pub const fn quiz_submission(id: QuizSubmissionId) -> Self {
        Self::QuizSubmission { id }
    }

    /// Creates a rubric assessment artifact.
    #[must_use]
    pub const fn rubric_assessment(
        id: RubricAssessmentId,
        assignment: Option<AssignmentId>,
    ) -> Self {
        Self::RubricAssessment { id, assignment }
    }

    /// The snake_case kind tag of this artifact.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Submission { .. } => "submission",
            Self::QuizSubmission { .. } => "quiz_submission",
            Self::RubricAssessment { .. } => "rubric_assessment",
        }
    }

    /// Returns the assessed assignment for a rubric assessment artifact.
    #[must_use]
    pub const fn assignment_id(&self) -> Option<AssignmentId> {
        match self {
            Self::RubricAssessment { assignment, .. } => *assignment,
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submission { id } => write!(f, "submission_{id}"),
            Self::QuizSubmission { id } => write!(f, "quiz_submission_{id}"),
            Self::RubricAssessment { id, .. } => write!(f, "rubric_assessment_{id}"),
        }
    }
}

/// The asset a result scores against, when finer-grained than the
/// association (e.g. a single question inside a quiz).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetRef {
    /// A whole quiz.
    Quiz {
        /// The quiz's ID.
        id: QuizId,
    },

    /// One assessment question.
    AssessmentQuestion {
        /// The question's ID.
        id: AssessmentQuestionId,
    },
}

impl AssetRef {
    /// Creates a quiz asset.
    #[must_use]
    pub const fn quiz(id: QuizId) -> Self {
        Self::Quiz { id }
    }

    /// Creates an assessment question asset.
    #[must_use]
    pub const fn assessment_question(id: AssessmentQuestionId) -> Self {
        Self::AssessmentQuestion { id }
    }

    /// The snake_case kind tag of this asset.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Quiz { .. } => "quiz",
            Self::AssessmentQuestion { .. } => "assessment_question",
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiz { id } => write!(f, "quiz_{id}"),
            Self::AssessmentQuestion { id } => write!(f, "assessment_question_{id}"),
        }
    }
}

/// The grading context a result was assessed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextRef {
    /// A course.
    Course {
        /// The course's ID.
        id: CourseId,
    },

    /// An institution-level account.
    Account {
        /// The account's ID.
        id: AccountId,
    },
}

impl ContextRef {
    /// Creates a course context.
    #[must_use]
    pub const fn course(id: CourseId) -> Self {
        Self::Course { id }
    }

    /// Creates an account context.
    #[must_use]
    pub const fn account(id: AccountId) -> Self {
        Self::Account { id }
    }

    /// The snake_case kind tag of this context.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Course { .. } => "course",
            Self::Account { .. } => "account",
        }
    }

    /// The deterministic context code: `"{kind}_{id}"`.
    #[must_use]
    pub fn code(&self) -> String {
        match self {
            Self::Course { id } => format!("course_{id}"),
            Self::Account { id } => format!("account_{id}"),
        }
    }
}

impl fmt::Display for ContextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}
