//! Conversions from the domain user model to the public DTOs.

use shared::{Family, FamilyMember, FamilyMembersResponse, PublicUser, UserWithFamilyResponse};

use crate::backend::domain::models::user::{User as DomainUser, UserWithFamily};

/// Mapper that strips server-only fields (the password hash) from users.
pub struct UserMapper;

impl UserMapper {
    pub fn to_public_user(domain: DomainUser) -> PublicUser {
        PublicUser {
            id: domain.id,
            username: domain.username,
            first_name: domain.first_name,
            last_name: domain.last_name,
            family_id: domain.family_id,
            role: domain.role,
        }
    }

    pub fn to_user_with_family_dto(domain: UserWithFamily) -> UserWithFamilyResponse {
        UserWithFamilyResponse {
            user: Self::to_public_user(domain.user),
            family: domain.family,
        }
    }

    pub fn to_member_dto(domain: DomainUser) -> FamilyMember {
        FamilyMember {
            id: domain.id,
            username: domain.username,
            first_name: domain.first_name,
            last_name: domain.last_name,
            role: domain.role,
        }
    }

    pub fn to_members_dto(family: Family, members: Vec<DomainUser>) -> FamilyMembersResponse {
        FamilyMembersResponse {
            family,
            members: members.into_iter().map(Self::to_member_dto).collect(),
        }
    }
}
