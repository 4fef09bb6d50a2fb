//! Domain events emitted by aggregate mutations

mod domain_event;

pub use domain_event::{
    ChannelArchivedEvent, ChannelCreatedEvent, ConversationArchivedEvent,
    ConversationCreatedEvent, ConversationUnarchivedEvent, DomainEvent, MemberJoinedEvent,
    MemberLeftEvent, MessageDeletedEvent, MessageEditedEvent, MessageReadEvent, MessageSentEvent,
    ModeratorAddedEvent, ModeratorRemovedEvent, ParticipantAddedEvent, ParticipantRemovedEvent,
    PresenceChangedEvent, ReactionAddedEvent, ReactionRemovedEvent, TypingStartedEvent,
};
