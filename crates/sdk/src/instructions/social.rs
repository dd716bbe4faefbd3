use crate::prelude::*;
use pulse_types::PulseError;

use crate::{error::SdkResult, impl_instruction, instructions::InstructionBuilder};

use super::PulseInstructions;

// Instruction discriminators
const FOLLOW_USER_DISCRIMINATOR: [u8; 8] = [126, 176, 97, 36, 63, 145, 4, 134];
const UNFOLLOW_USER_DISCRIMINATOR: [u8; 8] = [204, 183, 196, 110, 97, 165, 226, 213];
const JOIN_GROUP_DISCRIMINATOR: [u8; 8] = [121, 56, 199, 19, 250, 70, 44, 184];

/// Parameters for following a user (no params)
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct FollowUserParams {}

impl_instruction!(FollowUserParams, FOLLOW_USER_DISCRIMINATOR);

/// Parameters for unfollowing a user (no params)
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct UnfollowUserParams {}

impl_instruction!(UnfollowUserParams, UNFOLLOW_USER_DISCRIMINATOR);

/// Parameters for joining a group (no params)
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct JoinGroupParams {}

impl_instruction!(JoinGroupParams, JOIN_GROUP_DISCRIMINATOR);

impl PulseInstructions {
    /// Build follow user instruction.
    ///
    /// Follow records are plain accounts, so `follow_account` is a fresh
    /// keypair that must co-sign the transaction.
    pub fn follow_user(
        &self,
        follower: Pubkey,
        followed: Pubkey,
        follow_account: Pubkey,
    ) -> SdkResult<Instruction> {
        if follower == followed {
            return Err(PulseError::self_action("follow").into());
        }

        let follower_profile = self.pda.user_profile(&follower)?;
        let followed_profile = self.pda.user_profile(&followed)?;

        Ok(self
            .builder()
            .add_signer(follow_account)
            .add_signer(follower)
            .add_writable(follower_profile.address)
            .add_writable(followed_profile.address)
            .add_readonly(system_program::id())
            .with_data(FollowUserParams {}.build_data()?)
            .build())
    }

    /// Build unfollow user instruction; closes the follow record
    pub fn unfollow_user(
        &self,
        follower: Pubkey,
        followed: Pubkey,
        follow_account: Pubkey,
    ) -> SdkResult<Instruction> {
        let follower_profile = self.pda.user_profile(&follower)?;
        let followed_profile = self.pda.user_profile(&followed)?;

        Ok(self
            .builder()
            .add_writable(follow_account)
            .add_signer(follower)
            .add_writable(follower_profile.address)
            .add_writable(followed_profile.address)
            .with_data(UnfollowUserParams {}.build_data()?)
            .build())
    }

    /// Build join group instruction
    pub fn join_group(&self, member: Pubkey, group: Pubkey) -> SdkResult<Instruction> {
        let membership = self.pda.group_member(&group, &member)?;

        Ok(self
            .builder()
            .add_signer(member)
            .add_writable(group)
            .add_writable(membership.address)
            .add_readonly(system_program::id())
            .with_data(JoinGroupParams {}.build_data()?)
            .build())
    }
}
