mod user_dto;

pub use user_dto::{
    CreateUserDto, DeleteUserResponseDto, RoleStatsDto, UpdateUserRoleDto, UserListResponseDto,
    UserResponseDto, UserSummaryDto,
};
