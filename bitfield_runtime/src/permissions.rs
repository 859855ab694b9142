//! Guild permissions — a 64-bit flag kind with an administrator override.
//!
//! Permission masks exceed the JSON-safe integer range, so their wire form
//! is a decimal string (`"8"`, `"1125899906842624"`).

use bitfield_core::rules::plain_has;
use bitfield_core::{BitField, BitFieldError, FlagRegistry, HasRule, Resolvable};
use indexmap::IndexMap;

/// Permission flag registry.
#[derive(Debug, Clone, Copy)]
pub struct Permissions;

pub type PermissionsBitField = BitField<Permissions>;

impl Permissions {
    pub const ADMINISTRATOR: u64 = 1 << 3;
}

impl FlagRegistry for Permissions {
    type Bits = u64;
    const KIND: &'static str = "permissions";
    const FLAGS: &'static [(&'static str, u64)] = &[
        ("CreateInstantInvite", 1 << 0),
        ("KickMembers", 1 << 1),
        ("BanMembers", 1 << 2),
        ("Administrator", 1 << 3),
        ("ManageChannels", 1 << 4),
        ("ManageGuild", 1 << 5),
        ("AddReactions", 1 << 6),
        ("ViewAuditLog", 1 << 7),
        ("PrioritySpeaker", 1 << 8),
        ("Stream", 1 << 9),
        ("ViewChannel", 1 << 10),
        ("SendMessages", 1 << 11),
        ("SendTTSMessages", 1 << 12),
        ("ManageMessages", 1 << 13),
        ("EmbedLinks", 1 << 14),
        ("AttachFiles", 1 << 15),
        ("ReadMessageHistory", 1 << 16),
        ("MentionEveryone", 1 << 17),
        ("UseExternalEmojis", 1 << 18),
        ("ViewGuildInsights", 1 << 19),
        ("Connect", 1 << 20),
        ("Speak", 1 << 21),
        ("MuteMembers", 1 << 22),
        ("DeafenMembers", 1 << 23),
        ("MoveMembers", 1 << 24),
        ("UseVAD", 1 << 25),
        ("ChangeNickname", 1 << 26),
        ("ManageNicknames", 1 << 27),
        ("ManageRoles", 1 << 28),
        ("ManageWebhooks", 1 << 29),
        ("ManageGuildExpressions", 1 << 30),
        ("UseApplicationCommands", 1 << 31),
        ("RequestToSpeak", 1 << 32),
        ("ManageEvents", 1 << 33),
        ("ManageThreads", 1 << 34),
        ("CreatePublicThreads", 1 << 35),
        ("CreatePrivateThreads", 1 << 36),
        ("UseExternalStickers", 1 << 37),
        ("SendMessagesInThreads", 1 << 38),
        ("UseEmbeddedActivities", 1 << 39),
        ("ModerateMembers", 1 << 40),
        ("ViewCreatorMonetizationAnalytics", 1 << 41),
        ("UseSoundboard", 1 << 42),
        ("CreateGuildExpressions", 1 << 43),
        ("CreateEvents", 1 << 44),
        ("UseExternalSounds", 1 << 45),
        ("SendVoiceMessages", 1 << 46),
        ("SetVoiceChannelStatus", 1 << 48),
        ("SendPolls", 1 << 49),
        ("UseExternalApps", 1 << 50),
    ];
}

/// `has` rule under which `Administrator` implies every permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminOverride {
    pub check_admin: bool,
}

impl AdminOverride {
    pub const ON: AdminOverride = AdminOverride { check_admin: true };
    pub const OFF: AdminOverride = AdminOverride { check_admin: false };
}

impl HasRule<Permissions> for AdminOverride {
    fn has(&self, bitfield: u64, requested: u64) -> bool {
        (self.check_admin && plain_has::<Permissions>(bitfield, Permissions::ADMINISTRATOR))
            || plain_has::<Permissions>(bitfield, requested)
    }
}

/// Permission-aware queries on a permissions bitfield.
pub trait PermissionsExt {
    /// Every requested permission is granted, or the holder is an
    /// administrator and `check_admin` is set.
    fn has_permission<T: Into<Resolvable<Permissions>>>(
        &self,
        bits: T,
        check_admin: bool,
    ) -> Result<bool, BitFieldError>;

    /// At least one requested permission is granted, or the holder is an
    /// administrator and `check_admin` is set.
    fn any_permission<T: Into<Resolvable<Permissions>>>(
        &self,
        bits: T,
        check_admin: bool,
    ) -> Result<bool, BitFieldError>;

    /// Requested permissions the holder lacks.
    fn missing_permissions<T: Into<Resolvable<Permissions>>>(
        &self,
        bits: T,
        check_admin: bool,
    ) -> Result<Vec<&'static str>, BitFieldError>;

    /// Permission names actually granted. Never expands `Administrator`.
    fn permission_names(&self) -> Vec<&'static str>;

    /// Every permission mapped to whether it is effectively granted.
    fn permission_map(&self, check_admin: bool) -> IndexMap<&'static str, bool>;
}

impl PermissionsExt for PermissionsBitField {
    fn has_permission<T: Into<Resolvable<Permissions>>>(
        &self,
        bits: T,
        check_admin: bool,
    ) -> Result<bool, BitFieldError> {
        self.has_with(bits, &AdminOverride { check_admin })
    }

    fn any_permission<T: Into<Resolvable<Permissions>>>(
        &self,
        bits: T,
        check_admin: bool,
    ) -> Result<bool, BitFieldError> {
        let any = self.any(bits)?;
        Ok((check_admin && self.has(Permissions::ADMINISTRATOR)?) || any)
    }

    fn missing_permissions<T: Into<Resolvable<Permissions>>>(
        &self,
        bits: T,
        check_admin: bool,
    ) -> Result<Vec<&'static str>, BitFieldError> {
        if check_admin && self.has(Permissions::ADMINISTRATOR)? {
            // Still resolve, so bad input is reported even for administrators.
            BitField::<Permissions>::resolve(bits)?;
            return Ok(Vec::new());
        }
        self.missing_with(bits, &AdminOverride::OFF)
    }

    fn permission_names(&self) -> Vec<&'static str> {
        self.to_array_with(&AdminOverride::OFF)
    }

    fn permission_map(&self, check_admin: bool) -> IndexMap<&'static str, bool> {
        self.serialize_flags_with(&AdminOverride { check_admin })
    }
}
